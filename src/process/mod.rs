// src/process/mod.rs
pub mod convert;
pub mod raw_table;
pub mod utils;

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::{
    collections::HashSet,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::{debug, info, warn};

use crate::schema::{self, CleanStats, CleanTable, Record};
pub use raw_table::{RawCell, RawRecord, RawTable};
use utils::clean_field;

/// Parse a delimited source into raw records.
///
/// - The header row is trimmed and must contain every required column.
/// - Unknown columns are ignored; quoted multi-line fields are fine.
/// - A record the CSV reader cannot decode is skipped and counted.
///
/// Fails when the source has no header or no data rows.
#[tracing::instrument(level = "debug", skip(reader))]
pub fn read_raw_records<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // short rows leave trailing fields absent
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|h| utils::clean_str(h).to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        bail!("source is empty: no header row");
    }
    let missing = schema::missing_columns(&headers);
    if !missing.is_empty() {
        bail!("source is missing required columns: {}", missing.join(", "));
    }
    rdr.set_headers(StringRecord::from(headers.clone()));

    let mut rows = Vec::new();
    let mut malformed_rows = 0;
    for (idx, result) in rdr.deserialize::<RawRecord>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(record = idx, error = %e, "skipping undecodable record");
                malformed_rows += 1;
            }
        }
    }
    if rows.is_empty() {
        bail!("source is empty: no data rows");
    }

    debug!(rows = rows.len(), malformed_rows, "read raw records");
    Ok(RawTable {
        headers,
        rows,
        malformed_rows,
    })
}

/// Open `path` and read it with [`read_raw_records`].
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_raw_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open source file: {:?}", path.as_ref()))?;
    read_raw_records(BufReader::new(file))
        .with_context(|| format!("Failed to read source file: {:?}", path.as_ref()))
}

/// Turn raw rows into the canonical table.
///
/// Rows are deduplicated on the exact `(name, address, location)` triple
/// keeping the first, rating and cost are normalised, and rows still missing
/// rating, cost or location are dropped. `raw_rows` is left untouched.
pub fn load_and_clean(raw_rows: &[RawRecord]) -> CleanTable {
    let mut stats = CleanStats {
        raw_rows: raw_rows.len(),
        ..CleanStats::default()
    };
    let mut seen: HashSet<(Option<&str>, Option<&str>, Option<&str>)> =
        HashSet::with_capacity(raw_rows.len());
    let mut records = Vec::with_capacity(raw_rows.len());

    for raw in raw_rows {
        // duplicates must match exactly, before any trimming
        let key = (
            raw.name.as_deref(),
            raw.address.as_deref(),
            raw.location.as_deref(),
        );
        if !seen.insert(key) {
            stats.duplicate_rows += 1;
            continue;
        }

        let name = clean_field(raw.name.as_deref());
        let address = clean_field(raw.address.as_deref());
        let location = clean_field(raw.location.as_deref());

        let rate = raw.rate.as_ref().and_then(convert::parse_rating);
        let approx_cost = raw.approx_cost.as_ref().and_then(convert::parse_cost);
        let (Some(rate), Some(approx_cost), Some(location)) = (rate, approx_cost, location)
        else {
            stats.incomplete_rows += 1;
            continue;
        };

        let text = |v: &Option<String>| clean_field(v.as_deref()).unwrap_or_default().to_string();
        records.push(Record {
            name: name.unwrap_or_default().to_string(),
            address: address.unwrap_or_default().to_string(),
            location: location.to_string(),
            rate,
            approx_cost,
            votes: raw
                .votes
                .as_ref()
                .and_then(convert::parse_count)
                .unwrap_or(0),
            listed_in_type: text(&raw.listed_in_type),
            cuisines: text(&raw.cuisines),
            online_order: text(&raw.online_order),
            book_table: text(&raw.book_table),
        });
    }

    stats.clean_rows = records.len();
    info!(
        raw = stats.raw_rows,
        duplicates = stats.duplicate_rows,
        incomplete = stats.incomplete_rows,
        kept = stats.clean_rows,
        "cleaned table"
    );
    CleanTable::new(records, stats)
}

/// Read and clean the source at `path` in one go.
pub fn load_clean_table<P: AsRef<Path>>(path: P) -> Result<CleanTable> {
    let raw = load_raw_csv(path)?;
    Ok(load_and_clean(&raw.rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,zomato_eda::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const HEADER: &str = "url,address,name,online_order,book_table,rate,votes,location,cuisines,approx_cost(for two people),listed_in(type)\n";

    fn raw(name: &str, address: &str, location: &str, rate: &str, cost: &str) -> RawRecord {
        RawRecord {
            name: Some(name.into()),
            address: Some(address.into()),
            location: (!location.is_empty()).then(|| location.to_string()),
            rate: (!rate.is_empty()).then(|| RawCell::from(rate)),
            approx_cost: (!cost.is_empty()).then(|| RawCell::from(cost)),
            votes: Some(RawCell::Number(5.0)),
            listed_in_type: Some("Buffet".into()),
            cuisines: Some("Cafe".into()),
            online_order: Some("Yes".into()),
            book_table: Some("No".into()),
        }
    }

    #[test]
    fn test_read_zomato_csv() -> Result<()> {
        init_test_logging();
        let content = format!(
            "{HEADER}{}{}{}",
            "https://z/1,\"942, 21st Main Road, Banashankari\",Jalsa,Yes,Yes,4.1/5,775,Banashankari,\"North Indian, Mughlai, Chinese\",800,Buffet\n",
            "https://z/2,\"2nd Floor, Jayanagar\",Spice Elephant,Yes,No,NEW,0,Jayanagar,\"Chinese, Thai\",\"1,200\",Delivery\n",
            "https://z/3,Basavanagudi,Addhuri,No,No,3.7 /5,88,Basavanagudi,South Indian,300,Dine-out\n",
        );

        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;

        let table = load_raw_csv(tmp.path())?;
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.malformed_rows, 0);
        assert!(table.headers.iter().any(|h| h == "approx_cost(for two people)"));

        let first = &table.rows[0];
        assert_eq!(first.name.as_deref(), Some("Jalsa"));
        assert_eq!(first.rate, Some(RawCell::Text("4.1/5".into())));
        assert_eq!(first.approx_cost, Some(RawCell::Number(800.0)));
        assert_eq!(first.cuisines.as_deref(), Some("North Indian, Mughlai, Chinese"));
        assert_eq!(table.rows[1].approx_cost, Some(RawCell::Text("1,200".into())));

        let clean = load_and_clean(&table.rows);
        // "NEW" row has no rating
        assert_eq!(clean.len(), 2);
        assert_eq!(clean.records()[0].rate, 4.1);
        assert_eq!(clean.records()[0].votes, 775);
        assert_eq!(clean.records()[1].location, "Basavanagudi");
        assert_eq!(clean.records()[1].rate, 3.7);
        Ok(())
    }

    #[test]
    fn missing_optional_columns_default() -> Result<()> {
        let content = "name,address,location,rate,approx_cost(for two people),listed_in(type)\nA,Addr,BTM,4.0/5,400,Delivery\n";
        let table = read_raw_records(Cursor::new(content))?;
        let clean = load_and_clean(&table.rows);
        assert_eq!(clean.len(), 1);
        let r = &clean.records()[0];
        assert_eq!(r.votes, 0);
        assert_eq!(r.cuisines, "");
        assert_eq!(r.online_order, "");
        Ok(())
    }

    #[test]
    fn empty_source_is_fatal() {
        assert!(read_raw_records(Cursor::new("")).is_err());
        assert!(read_raw_records(Cursor::new(HEADER)).is_err());
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let err = read_raw_records(Cursor::new("name,address,rate\nA,B,4.0/5\n")).unwrap_err();
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn unreadable_source_is_fatal() {
        assert!(load_raw_csv("/definitely/not/here/zomato.csv").is_err());
    }

    #[test]
    fn duplicates_keep_first() {
        let mut second = raw("Jalsa", "21st Main", "Banashankari", "3.0/5", "500");
        second.cuisines = Some("Other".into());
        let rows = vec![raw("Jalsa", "21st Main", "Banashankari", "4.1/5", "800"), second];

        let table = load_and_clean(&rows);
        assert_eq!(table.len(), 1);
        let r = &table.records()[0];
        assert_eq!(r.rate, 4.1);
        assert_eq!(r.approx_cost, 800.0);
        assert_eq!(r.cuisines, "Cafe");
        assert_eq!(table.stats().duplicate_rows, 1);
    }

    #[test]
    fn duplicate_of_incomplete_first_row_is_dropped() {
        let rows = vec![
            raw("Jalsa", "21st Main", "Banashankari", "NEW", "800"),
            raw("Jalsa", "21st Main", "Banashankari", "4.1/5", "800"),
        ];
        let table = load_and_clean(&rows);
        assert!(table.is_empty());
        assert_eq!(table.stats().duplicate_rows, 1);
        assert_eq!(table.stats().incomplete_rows, 1);
    }

    #[test]
    fn incomplete_rows_are_dropped() {
        let rows = vec![
            raw("a", "x", "BTM", "-", "300"),
            raw("b", "x", "BTM", "4.0/5", "n/a"),
            raw("c", "x", "", "4.0/5", "300"),
            raw("d", "x", "BTM", "3.2/5", "1,500"),
        ];
        let table = load_and_clean(&rows);
        assert_eq!(table.len(), 1);
        assert!(table.len() <= rows.len());
        let r = &table.records()[0];
        assert_eq!(r.name, "d");
        assert_eq!(r.approx_cost, 1500.0);
        assert_eq!(
            table.stats(),
            CleanStats {
                raw_rows: 4,
                duplicate_rows: 0,
                incomplete_rows: 3,
                clean_rows: 1,
            }
        );
    }

    #[test]
    fn malformed_votes_keep_the_row() -> Result<()> {
        init_test_logging();
        let content = "name,address,location,rate,approx_cost(for two people),listed_in(type),votes\n\
                       A,x,BTM,4.1/5,800,Delivery,true\n\
                       B,x,BTM,3.9/5,400,Delivery,abc\n\
                       C,x,BTM,3.5/5,300,Delivery,99999999999999999999999\n\
                       D,x,BTM,3.0/5,99999999999999999999999,Delivery,3\n";
        let table = read_raw_records(Cursor::new(content))?;
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.malformed_rows, 0);
        assert_eq!(table.rows[0].votes, Some(RawCell::Text("true".into())));

        let clean = load_and_clean(&table.rows);
        assert_eq!(clean.len(), 4);
        let votes: Vec<_> = clean.records().iter().map(|r| (r.name.as_str(), r.votes)).collect();
        assert_eq!(votes, vec![("A", 0), ("B", 0), ("C", 0), ("D", 3)]);
        assert!(clean.records()[3].approx_cost > 1e22);
        Ok(())
    }

    #[test]
    fn bad_first_occurrence_still_wins_dedup() -> Result<()> {
        let content = "name,address,location,rate,approx_cost(for two people),listed_in(type),votes\n\
                       Jalsa,21st Main,Banashankari,4.1/5,800,Buffet,false\n\
                       Jalsa,21st Main,Banashankari,3.0/5,500,Buffet,120\n";
        let table = read_raw_records(Cursor::new(content))?;
        assert_eq!(table.malformed_rows, 0);

        let clean = load_and_clean(&table.rows);
        assert_eq!(clean.len(), 1);
        let r = &clean.records()[0];
        assert_eq!(r.rate, 4.1);
        assert_eq!(r.votes, 0);
        assert_eq!(clean.stats().duplicate_rows, 1);
        Ok(())
    }

    #[test]
    fn dedup_compares_exact_values() {
        let rows = vec![
            raw("Jalsa", "21st Main", "BTM", "4.1/5", "800"),
            raw("Jalsa", "21st Main", " BTM", "4.0/5", "700"),
        ];
        let table = load_and_clean(&rows);
        assert_eq!(table.len(), 2);
        assert_eq!(table.stats().duplicate_rows, 0);
        // values are still trimmed once kept
        assert_eq!(table.records()[1].location, "BTM");
    }

    #[test]
    fn input_rows_are_not_mutated() {
        let rows = vec![raw("a", "x", "BTM", "4.5/5", "1,000")];
        let before = rows.clone();
        let _ = load_and_clean(&rows);
        assert_eq!(rows, before);
    }
}

use anyhow::{Context, Result};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

use super::Dashboard;
use crate::filter::FilteredView;
use crate::schema::arrow::records_to_batch;

/// `<dir>/.<file_name>.tmp` next to the final path.
fn tmp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory `{}`", dir.display()))?;
    }
    Ok(())
}

/// Write the dashboard as pretty JSON, atomically (tmp file, then rename).
pub fn write_json(path: &Path, dashboard: &Dashboard) -> Result<()> {
    ensure_parent(path)?;
    let tmp_path = tmp_path_for(path);

    let mut tmp = BufWriter::new(
        File::create(&tmp_path)
            .with_context(|| format!("could not create temporary file `{}`", tmp_path.display()))?,
    );
    serde_json::to_writer_pretty(&mut tmp, dashboard).context("serializing dashboard JSON")?;
    tmp.write_all(b"\n")?;
    tmp.flush()?;
    drop(tmp);

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed to rename `{}` to `{}`",
            tmp_path.display(),
            path.display()
        )
    })?;
    info!(path = %path.display(), rows = dashboard.filtered_rows, "wrote dashboard JSON");
    Ok(())
}

/// Export the view's data table (`name, location, rate, approx_cost,
/// cuisines`) to a Snappy-compressed Parquet file. Returns the row count.
pub fn write_parquet(path: &Path, view: &FilteredView<'_>) -> Result<usize> {
    ensure_parent(path)?;
    let tmp_path = tmp_path_for(path);

    let batch = records_to_batch(view.iter())?;
    let tmp_file = File::create(&tmp_path)
        .with_context(|| format!("could not create temporary file `{}`", tmp_path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(tmp_file), batch.schema(), Some(props))
        .context("creating ArrowWriter for view export")?;
    writer.write(&batch).context("writing view batch")?;
    writer.close().context("closing ArrowWriter for view export")?;

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed to rename `{}` to `{}`",
            tmp_path.display(),
            path.display()
        )
    })?;
    info!(path = %path.display(), rows = batch.num_rows(), "exported view to parquet");
    Ok(batch.num_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DEFAULT_TOP_CUISINES;
    use crate::filter::{filter_table, FilterParams};
    use crate::schema::types::fixtures::record;
    use crate::schema::CleanTable;
    use arrow::array::{Array, StringArray};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::tempdir;

    fn table() -> CleanTable {
        let mut b = record("b", "Jayanagar", 650.0);
        b.cuisines.clear();
        CleanTable::from_records(vec![record("a", "BTM", 300.0), b])
    }

    #[test]
    fn json_round_trip_fields() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out").join("dashboard.json");
        let table = table();
        let params = FilterParams::select_all(&table);
        let view = filter_table(&table, &params);

        write_json(&path, &Dashboard::build(&view, &params, DEFAULT_TOP_CUISINES))?;

        let value: serde_json::Value = serde_json::from_reader(File::open(&path)?)?;
        assert_eq!(value["filtered_rows"], 2);
        assert_eq!(value["location_counts"][0]["value"], "BTM");
        assert!(!tmp_path_for(&path).exists());
        Ok(())
    }

    #[test]
    fn parquet_export_reads_back() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("view.parquet");
        let table = table();
        let view = filter_table(&table, &FilterParams::select_all(&table));

        assert_eq!(write_parquet(&path, &view)?, 2);

        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
        assert_eq!(builder.metadata().file_metadata().num_rows(), 2);
        let batches = builder.build()?.collect::<std::result::Result<Vec<_>, _>>()?;
        let batch = &batches[0];
        let names = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("name must be StringArray");
        assert_eq!(names.value(1), "b");
        assert!(batch.column(4).is_null(1));
        Ok(())
    }
}

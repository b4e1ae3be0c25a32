pub mod write;

use anyhow::Result;
use arrow::util::pretty::pretty_format_batches;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

use crate::aggregate::{
    book_table_counts, cuisine_counts, kpis, location_counts, online_order_counts,
    rating_distribution, Kpis, RatingSummary, ValueCount,
};
use crate::filter::{FilterParams, FilteredView};
use crate::process::utils::format_thousands;
use crate::schema::arrow::records_to_batch;
use crate::schema::Record;

const BAR_WIDTH: usize = 40;

/// One point of the cost-vs-rating scatter, sized by votes, coloured by
/// service type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub name: String,
    pub approx_cost: f64,
    pub rate: f64,
    pub votes: u64,
    pub listed_in_type: String,
}

pub fn scatter_points(view: &FilteredView<'_>) -> Vec<ScatterPoint> {
    view.iter()
        .map(|r| ScatterPoint {
            name: r.name.clone(),
            approx_cost: r.approx_cost,
            rate: r.rate,
            votes: r.votes,
            listed_in_type: r.listed_in_type.clone(),
        })
        .collect()
}

/// A row of the data table under the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub name: String,
    pub location: String,
    pub rate: f64,
    pub approx_cost: f64,
    pub cuisines: String,
}

impl From<&Record> for TableRow {
    fn from(r: &Record) -> Self {
        Self {
            name: r.name.clone(),
            location: r.location.clone(),
            rate: r.rate,
            approx_cost: r.approx_cost,
            cuisines: r.cuisines.clone(),
        }
    }
}

/// Everything a renderer needs for one interaction.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub filtered_rows: usize,
    pub total_rows: usize,
    pub filters: FilterParams,
    pub kpis: Kpis,
    pub location_counts: Vec<ValueCount>,
    pub scatter: Vec<ScatterPoint>,
    pub rating_distribution: Vec<RatingSummary>,
    pub top_cuisines: Vec<ValueCount>,
    pub online_order: Vec<ValueCount>,
    pub book_table: Vec<ValueCount>,
    pub table: Vec<TableRow>,
}

impl Dashboard {
    pub fn build(view: &FilteredView<'_>, params: &FilterParams, top_cuisines: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            filtered_rows: view.len(),
            total_rows: view.table().len(),
            filters: params.clone(),
            kpis: kpis(view),
            location_counts: location_counts(view),
            scatter: scatter_points(view),
            rating_distribution: rating_distribution(view),
            top_cuisines: cuisine_counts(view, top_cuisines),
            online_order: online_order_counts(view),
            book_table: book_table_counts(view),
            table: view.iter().map(TableRow::from).collect(),
        }
    }

    /// Header line plus the four KPI figures.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Analysing {} filtered restaurants out of {}.",
            self.filtered_rows, self.total_rows
        );
        let _ = writeln!(
            out,
            "  Mean rating     : {}",
            fmt_or_no_data(self.kpis.mean_rating, |v| format!("{v:.2} / 5"))
        );
        let _ = writeln!(
            out,
            "  Mean cost (two) : {}",
            fmt_or_no_data(self.kpis.mean_cost, |v| format!("{v:.0} ₹"))
        );
        let _ = writeln!(
            out,
            "  Total votes     : {}",
            format_thousands(self.kpis.total_votes)
        );
        let _ = writeln!(out, "  Locations       : {}", self.kpis.distinct_locations);
        out
    }

    /// Text rendering of the charts.
    pub fn render_charts(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "\nRestaurant density by location");
        out.push_str(&render_bars(&self.location_counts));

        let _ = writeln!(out, "\nRating distribution by service type");
        if self.rating_distribution.is_empty() {
            let _ = writeln!(out, "  no data");
        }
        for s in &self.rating_distribution {
            let _ = writeln!(
                out,
                "  {:<20} n={:<5} min={:.1} q1={:.2} median={:.2} q3={:.2} max={:.1}",
                s.service_type, s.count, s.min, s.q1, s.median, s.q3, s.max
            );
        }

        let _ = writeln!(out, "\nTop {} cuisines", self.top_cuisines.len());
        out.push_str(&render_shares(&self.top_cuisines));
        let _ = writeln!(out, "\nOnline ordering");
        out.push_str(&render_shares(&self.online_order));
        let _ = writeln!(out, "\nTable booking");
        out.push_str(&render_shares(&self.book_table));
        out
    }

    /// KPIs and charts together.
    pub fn render_text(&self) -> String {
        let mut out = self.render_summary();
        out.push_str(&self.render_charts());
        out
    }
}

/// Pretty-printed data table of the first `limit` rows of `view`.
pub fn render_table(view: &FilteredView<'_>, limit: usize) -> Result<String> {
    let batch = records_to_batch(view.iter().take(limit))?;
    let mut out = pretty_format_batches(&[batch])?.to_string();
    if view.len() > limit {
        let _ = write!(out, "\n({} of {} rows shown)", limit, view.len());
    }
    Ok(out)
}

fn fmt_or_no_data(v: Option<f64>, f: impl Fn(f64) -> String) -> String {
    v.map(f).unwrap_or_else(|| "no data".to_string())
}

fn render_bars(counts: &[ValueCount]) -> String {
    let Some(top) = counts.first().map(|c| c.count) else {
        return "  no data\n".to_string();
    };
    let width = counts.iter().map(|c| c.value.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for c in counts {
        let len = (c.count * BAR_WIDTH).div_ceil(top.max(1));
        let _ = writeln!(
            out,
            "  {:<width$} {:>6} {}",
            c.value,
            c.count,
            "#".repeat(len),
            width = width
        );
    }
    out
}

fn render_shares(counts: &[ValueCount]) -> String {
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return "  no data\n".to_string();
    }
    let mut out = String::new();
    for c in counts {
        let _ = writeln!(
            out,
            "  {:<24} {:>6} {:>5.1}%",
            c.value,
            c.count,
            100.0 * c.count as f64 / total as f64
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DEFAULT_TOP_CUISINES;
    use crate::filter::{filter_table, PriceRange};
    use crate::schema::types::fixtures::record;
    use crate::schema::CleanTable;

    fn table() -> CleanTable {
        let mut b = record("Jalsa", "Banashankari", 800.0);
        b.votes = 1500;
        b.rate = 4.1;
        CleanTable::from_records(vec![record("Addhuri", "BTM", 300.0), b])
    }

    #[test]
    fn builds_every_series() {
        let table = table();
        let params = FilterParams::select_all(&table);
        let view = filter_table(&table, &params);
        let d = Dashboard::build(&view, &params, 1);

        assert_eq!(d.filtered_rows, 2);
        assert_eq!(d.total_rows, 2);
        assert_eq!(d.scatter.len(), 2);
        assert_eq!(d.scatter[1].votes, 1500);
        assert_eq!(d.top_cuisines.len(), 1);
        assert_eq!(d.table[1].name, "Jalsa");
        assert_eq!(d.rating_distribution[0].count, 2);

        let text = d.render_text();
        assert!(text.contains("Analysing 2 filtered restaurants out of 2."));
        assert!(text.contains("4.05 / 5"));
        assert!(text.contains("550 ₹"));
        assert!(text.contains("1,510"));
    }

    #[test]
    fn scatter_follows_view_order() {
        let table = table();
        let params = FilterParams::new(["Banashankari"], ["Delivery"], PriceRange::new(0.0, 1e6));
        let points = scatter_points(&filter_table(&table, &params));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "Jalsa");
        assert_eq!(points[0].approx_cost, 800.0);
        assert_eq!(points[0].rate, 4.1);
        assert_eq!(points[0].listed_in_type, "Delivery");
    }

    #[test]
    fn empty_view_renders_no_data() {
        let table = table();
        let params = FilterParams::new(["nowhere"], ["Delivery"], PriceRange::new(0.0, 1e6));
        let view = filter_table(&table, &params);
        let d = Dashboard::build(&view, &params, DEFAULT_TOP_CUISINES);

        let text = d.render_text();
        assert!(text.contains("Analysing 0 filtered restaurants out of 2."));
        assert!(text.contains("Mean rating     : no data"));
        assert!(text.contains("Mean cost (two) : no data"));
        assert!(text.contains("Total votes     : 0"));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn table_is_truncated() -> Result<()> {
        let table = table();
        let params = FilterParams::select_all(&table);
        let view = filter_table(&table, &params);
        let text = render_table(&view, 1)?;
        assert!(text.contains("Addhuri"));
        assert!(!text.contains("Jalsa"));
        assert!(text.contains("(1 of 2 rows shown)"));
        Ok(())
    }

    #[test]
    fn dashboard_serializes() -> Result<()> {
        let table = table();
        let params = FilterParams::select_all(&table);
        let view = filter_table(&table, &params);
        let json = serde_json::to_value(Dashboard::build(&view, &params, DEFAULT_TOP_CUISINES))?;
        assert_eq!(json["kpis"]["total_votes"], 1510);
        assert_eq!(json["table"][0]["location"], "BTM");
        assert!(json["filters"]["locations"].is_array());
        Ok(())
    }
}

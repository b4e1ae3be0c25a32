pub mod distribution;

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::filter::FilteredView;

pub use distribution::{rating_distribution, RatingSummary};

/// How many cuisines the cuisine breakdown keeps by default.
pub const DEFAULT_TOP_CUISINES: usize = 15;

/// Headline figures for a view. Means are `None` on an empty view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub restaurants: usize,
    pub mean_rating: Option<f64>,
    pub mean_cost: Option<f64>,
    pub total_votes: u64,
    pub distinct_locations: usize,
}

/// One bucket of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

pub fn kpis(view: &FilteredView<'_>) -> Kpis {
    Kpis {
        restaurants: view.len(),
        mean_rating: mean(view.iter().map(|r| r.rate)),
        mean_cost: mean(view.iter().map(|r| r.approx_cost)),
        total_votes: total_votes(view),
        distinct_locations: view
            .iter()
            .map(|r| r.location.as_str())
            .collect::<HashSet<_>>()
            .len(),
    }
}

/// Arithmetic mean, `None` when there is nothing to average.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

pub fn total_votes(view: &FilteredView<'_>) -> u64 {
    view.iter().map(|r| r.votes).fold(0u64, u64::saturating_add)
}

/// Frequency table, most common first; equal counts keep first-seen order.
/// Blank values are not counted.
pub fn value_counts<'a, I: IntoIterator<Item = &'a str>>(values: I) -> Vec<ValueCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, v) in values.into_iter().filter(|v| !v.is_empty()).enumerate() {
        counts.entry(v).or_insert((pos, 0)).1 += 1;
    }
    let mut rows: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(v, (first, count))| (v, first, count))
        .collect();
    rows.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    rows.into_iter()
        .map(|(value, _, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect()
}

pub fn location_counts(view: &FilteredView<'_>) -> Vec<ValueCount> {
    value_counts(view.iter().map(|r| r.location.as_str()))
}

/// Cuisine frequencies after splitting each row's list, truncated to `top_n`.
pub fn cuisine_counts(view: &FilteredView<'_>, top_n: usize) -> Vec<ValueCount> {
    let mut counts = value_counts(view.iter().flat_map(|r| r.cuisine_list()));
    counts.truncate(top_n);
    counts
}

pub fn online_order_counts(view: &FilteredView<'_>) -> Vec<ValueCount> {
    value_counts(view.iter().map(|r| r.online_order.as_str()))
}

pub fn book_table_counts(view: &FilteredView<'_>) -> Vec<ValueCount> {
    value_counts(view.iter().map(|r| r.book_table.as_str()))
}

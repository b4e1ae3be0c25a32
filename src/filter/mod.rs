use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::schema::{CleanTable, Record};

/// Inclusive cost bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `min <= cost <= max`. A range with `min > max` contains nothing.
    pub fn contains(&self, cost: f64) -> bool {
        self.min <= cost && cost <= self.max
    }

    /// Slider domain for a table: whole-unit floor of the cheapest and
    /// dearest cost.
    pub fn domain(table: &CleanTable) -> Option<Self> {
        table
            .cost_bounds()
            .map(|(lo, hi)| Self::new(lo.floor(), hi.floor()))
    }
}

/// How the initial selection is picked when none is configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDefaults {
    /// How many of the sorted locations start selected.
    pub location_count: usize,
    /// Upper end of the initial price range, capped to the domain.
    pub price_cap: f64,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            location_count: 5,
            price_cap: 2000.0,
        }
    }
}

/// The user's current selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub locations: BTreeSet<String>,
    pub service_types: BTreeSet<String>,
    pub price_range: PriceRange,
}

impl FilterParams {
    pub fn new<L, T>(locations: L, service_types: T, price_range: PriceRange) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            locations: locations.into_iter().map(Into::into).collect(),
            service_types: service_types.into_iter().map(Into::into).collect(),
            price_range,
        }
    }

    /// Every location, every service type and the exact cost bounds: selects
    /// the whole table.
    pub fn select_all(table: &CleanTable) -> Self {
        let (lo, hi) = table.cost_bounds().unwrap_or((0.0, 0.0));
        Self::new(
            table.locations(),
            table.service_types(),
            PriceRange::new(lo, hi),
        )
    }

    /// Initial selection: the first `location_count` sorted locations, all
    /// service types, and `(domain.min, min(price_cap, domain.max))`.
    pub fn initial(table: &CleanTable, defaults: &FilterDefaults) -> Self {
        let domain = PriceRange::domain(table).unwrap_or(PriceRange::new(0.0, 0.0));
        let mut locations = table.locations();
        locations.truncate(defaults.location_count);
        Self::new(
            locations,
            table.service_types(),
            PriceRange::new(domain.min, defaults.price_cap.min(domain.max)),
        )
    }

    /// Row predicate: every criterion must hold.
    pub fn matches(&self, record: &Record) -> bool {
        self.locations.contains(&record.location)
            && self.service_types.contains(&record.listed_in_type)
            && self.price_range.contains(record.approx_cost)
    }
}

/// Rows of a [`CleanTable`] matching a [`FilterParams`], in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a CleanTable,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn table(&self) -> &'a CleanTable {
        self.table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row positions in the underlying table.
    pub fn indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.table.records();
        self.rows.iter().map(move |&i| &records[i])
    }

    pub fn to_records(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }
}

/// Apply `params` to `table`. An empty location or service-type selection
/// yields an empty view.
pub fn filter_table<'a>(table: &'a CleanTable, params: &FilterParams) -> FilteredView<'a> {
    let rows: Vec<usize> = table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| params.matches(r))
        .map(|(i, _)| i)
        .collect();
    debug!(
        kept = rows.len(),
        total = table.len(),
        locations = params.locations.len(),
        service_types = params.service_types.len(),
        min = params.price_range.min,
        max = params.price_range.max,
        "filtered table"
    );
    FilteredView { table, rows }
}

// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One cleaned restaurant row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub address: String,
    pub location: String,
    /// Score out of 5.
    pub rate: f64,
    /// Cost for two people.
    pub approx_cost: f64,
    pub votes: u64,
    pub listed_in_type: String,
    pub cuisines: String,
    pub online_order: String,
    pub book_table: String,
}

impl Record {
    /// Individual cuisine names, in listed order.
    pub fn cuisine_list(&self) -> impl Iterator<Item = &str> {
        self.cuisines
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// What the cleaning pass did to the raw rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanStats {
    pub raw_rows: usize,
    pub duplicate_rows: usize,
    pub incomplete_rows: usize,
    pub clean_rows: usize,
}

/// The canonical, deduplicated and complete record set. Never mutated after
/// construction; filters borrow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanTable {
    records: Vec<Record>,
    stats: CleanStats,
}

impl CleanTable {
    pub fn new(records: Vec<Record>, stats: CleanStats) -> Self {
        Self { records, stats }
    }

    /// Build a table from already-clean records (no dedupe, no stats).
    pub fn from_records(records: Vec<Record>) -> Self {
        let n = records.len();
        Self {
            records,
            stats: CleanStats {
                raw_rows: n,
                clean_rows: n,
                ..CleanStats::default()
            },
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> CleanStats {
        self.stats
    }

    /// Distinct locations, sorted.
    pub fn locations(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.location.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Distinct service types in order of first appearance; blanks skipped.
    pub fn service_types(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.listed_in_type.as_str())
            .filter(|t| !t.is_empty() && seen.insert(*t))
            .map(str::to_string)
            .collect()
    }

    /// `(min, max)` of `approx_cost`, or `None` for an empty table.
    pub fn cost_bounds(&self) -> Option<(f64, f64)> {
        self.records.iter().fold(None, |acc, r| match acc {
            None => Some((r.approx_cost, r.approx_cost)),
            Some((lo, hi)) => Some((lo.min(r.approx_cost), hi.max(r.approx_cost))),
        })
    }
}

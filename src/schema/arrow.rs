// src/schema/arrow.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use super::{Record, APPROX_COST, CUISINES, LOCATION, NAME, RATE};

/// Schema of the data table shown under the charts:
/// `name, location, rate, approx_cost, cuisines`.
pub fn display_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(NAME, DataType::Utf8, false),
        Field::new(LOCATION, DataType::Utf8, false),
        Field::new(RATE, DataType::Float64, false),
        Field::new(APPROX_COST, DataType::Float64, false),
        // blank cuisine lists are written as nulls
        Field::new(CUISINES, DataType::Utf8, true),
    ]))
}

/// Build a display-table batch from `records`, in iteration order.
pub fn records_to_batch<'a, I>(records: I) -> Result<RecordBatch>
where
    I: IntoIterator<Item = &'a Record>,
{
    let records: Vec<&Record> = records.into_iter().collect();

    let names: StringArray = records.iter().map(|r| Some(r.name.as_str())).collect();
    let locations: StringArray = records.iter().map(|r| Some(r.location.as_str())).collect();
    let rates = Float64Array::from_iter_values(records.iter().map(|r| r.rate));
    let costs = Float64Array::from_iter_values(records.iter().map(|r| r.approx_cost));
    let cuisines: StringArray = records
        .iter()
        .map(|r| Some(r.cuisines.as_str()).filter(|c| !c.is_empty()))
        .collect();

    RecordBatch::try_new(
        display_schema(),
        vec![
            Arc::new(names) as ArrayRef,
            Arc::new(locations),
            Arc::new(rates),
            Arc::new(costs),
            Arc::new(cuisines),
        ],
    )
    .context("building display-table RecordBatch")
}

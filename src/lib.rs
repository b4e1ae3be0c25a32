//! Exploratory analysis of the Zomato Bengaluru restaurant dataset.
//!
//! The source file is cleaned once per version into a [`CleanTable`], then
//! every interaction filters it into a [`FilteredView`] and aggregates the
//! view into a [`Dashboard`](dashboard::Dashboard).

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod process;
pub mod schema;
pub mod session;

pub use cache::TableCache;
pub use filter::{filter_table, FilterParams, FilteredView, PriceRange};
pub use process::{load_and_clean, load_clean_table};
pub use schema::{CleanTable, Record};

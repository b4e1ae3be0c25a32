pub mod arrow;
pub mod types;

pub use types::{CleanStats, CleanTable, Record};

pub const NAME: &str = "name";
pub const ADDRESS: &str = "address";
pub const LOCATION: &str = "location";
pub const RATE: &str = "rate";
/// Raw cost column; exposed as `approx_cost` once cleaned.
pub const RAW_COST: &str = "approx_cost(for two people)";
pub const APPROX_COST: &str = "approx_cost";
pub const VOTES: &str = "votes";
/// Raw service-type column; exposed as `listed_in_type` once cleaned.
pub const RAW_SERVICE_TYPE: &str = "listed_in(type)";
pub const CUISINES: &str = "cuisines";
pub const ONLINE_ORDER: &str = "online_order";
pub const BOOK_TABLE: &str = "book_table";

/// Headers the loader refuses to run without. `votes`, `cuisines` and the two
/// flags are optional and default to 0 / empty.
pub const REQUIRED_COLUMNS: [&str; 6] = [NAME, ADDRESS, LOCATION, RATE, RAW_COST, RAW_SERVICE_TYPE];

/// Required columns missing from `headers`, in declaration order.
pub fn missing_columns(headers: &[String]) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == col))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_missing_required_columns() {
        let headers: Vec<String> = [NAME, LOCATION, RATE, "votes"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            missing_columns(&headers),
            vec![ADDRESS, RAW_COST, RAW_SERVICE_TYPE]
        );
    }
}

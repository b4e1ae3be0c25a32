use serde::{Deserialize, Deserializer};
use std::borrow::Cow;

/// A cell that may arrive as text (`"4.1/5"`, `"1,200"`) or already numeric.
///
/// Source fields are read as text and classified by [`RawCell::classify`]:
/// anything that parses as a float becomes `Number`, everything else stays
/// `Text`. Empty fields never reach this type; they deserialize to `None` on
/// the owning `Option`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Number(f64),
    Text(String),
}

impl RawCell {
    pub fn classify(field: &str) -> Self {
        match field.trim().parse::<f64>() {
            Ok(v) => RawCell::Number(v),
            Err(_) => RawCell::Text(field.to_string()),
        }
    }

    /// Text form of the cell, borrowing when it already is text.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawCell::Text(s) => Cow::Borrowed(s.as_str()),
            RawCell::Number(v) => Cow::Owned(v.to_string()),
        }
    }
}

/// Reads the field as a plain string so `true` or a 30-digit integer never
/// fails the whole record.
fn classify_cell<'de, D>(deserializer: D) -> Result<Option<RawCell>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<String>::deserialize(deserializer)?;
    Ok(field.as_deref().map(RawCell::classify))
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

impl From<f64> for RawCell {
    fn from(v: f64) -> Self {
        RawCell::Number(v)
    }
}

/// One row of the source file, before any normalisation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    pub name: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "classify_cell")]
    pub rate: Option<RawCell>,
    #[serde(
        rename = "approx_cost(for two people)",
        default,
        deserialize_with = "classify_cell"
    )]
    pub approx_cost: Option<RawCell>,
    #[serde(default, deserialize_with = "classify_cell")]
    pub votes: Option<RawCell>,
    #[serde(rename = "listed_in(type)")]
    pub listed_in_type: Option<String>,
    pub cuisines: Option<String>,
    pub online_order: Option<String>,
    pub book_table: Option<String>,
}

#[derive(Debug, Default)]
pub struct RawTable {
    /// Column names as found in the header row (trimmed).
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
    /// Records the CSV reader could not decode at all (e.g. invalid UTF-8).
    pub malformed_rows: usize,
}

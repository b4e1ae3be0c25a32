use crate::process::raw_table::RawCell;

/// Rating markers meaning "not rated yet".
const NOT_RATED: [&str; 2] = ["NEW", "-"];

const MAX_RATING: f64 = 5.0;

/// Normalise a raw rating cell into a score out of 5.
///
/// Text is cut at the first `/` (`"4.1 /5"` → `4.1`); `NEW` and `-` are
/// absent. Numbers pass through. Anything unparseable, non-finite or outside
/// `[0, 5]` is absent.
pub fn parse_rating(cell: &RawCell) -> Option<f64> {
    let value = match cell {
        RawCell::Text(s) => {
            let head = s.split('/').next().unwrap_or_default().trim();
            if head.is_empty() || NOT_RATED.contains(&head) {
                return None;
            }
            head.parse::<f64>().ok()?
        }
        RawCell::Number(v) => *v,
    };
    (value.is_finite() && (0.0..=MAX_RATING).contains(&value)).then_some(value)
}

/// Normalise a cost cell (`"1,200"` → `1200.0`). Negative or unparseable
/// values are absent.
pub fn parse_cost(cell: &RawCell) -> Option<f64> {
    let text = cell.as_text();
    let digits: String = text.chars().filter(|c| *c != ',').collect();
    let value: f64 = digits.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Normalise a vote count. Fractional, negative or unparseable counts are absent.
pub fn parse_count(cell: &RawCell) -> Option<u64> {
    let value = parse_cost(cell)?;
    (value.fract() == 0.0 && value <= u64::MAX as f64).then_some(value as u64)
}

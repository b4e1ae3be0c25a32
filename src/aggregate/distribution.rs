use serde::Serialize;

use crate::filter::FilteredView;

/// Five-number summary of ratings for one service type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub service_type: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Linear-interpolated quantile of an ascending slice.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Rating spread per service type, groups in first-seen order.
pub fn rating_distribution(view: &FilteredView<'_>) -> Vec<RatingSummary> {
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for r in view.iter() {
        match groups.iter_mut().find(|(t, _)| *t == r.listed_in_type) {
            Some((_, rates)) => rates.push(r.rate),
            None => groups.push((r.listed_in_type.as_str(), vec![r.rate])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(service_type, mut rates)| {
            rates.sort_by(f64::total_cmp);
            Some(RatingSummary {
                service_type: service_type.to_string(),
                count: rates.len(),
                min: *rates.first()?,
                q1: quantile(&rates, 0.25)?,
                median: quantile(&rates, 0.5)?,
                q3: quantile(&rates, 0.75)?,
                max: *rates.last()?,
            })
        })
        .collect()
}

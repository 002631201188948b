use chrono::{DateTime, Utc};

use crate::config::FilterConfig;

/// Date stage verdict for an article's publication date.
///
/// An unknown date passes unless strict-date is set; a known date must lie
/// within the configured bounds, both inclusive.
pub fn passes(config: &FilterConfig, published_at: Option<DateTime<Utc>>) -> bool {
    match published_at {
        None => !config.strict_date(),
        Some(date) => within_bounds(date, config.start_date(), config.end_date()),
    }
}

pub fn within_bounds(
    date: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> bool {
    start.is_none_or(|start| date >= start) && end.is_none_or(|end| date <= end)
}

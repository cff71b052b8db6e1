//! Latest remaining-estimate lookup.

use crate::config::TimestampPolicy;
use crate::error::{EffortError, Result};
use crate::matcher::leading_event;
use crate::models::HistoryEntry;
use crate::normalize::normalize_history;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Hours held by the most recent change of `field`, whose values are in seconds.
///
/// Returns `None` when the field never changed. Timestamps are parsed strictly since
/// picking the latest entry depends on them.
pub fn latest_estimate_hours(history: &[HistoryEntry], field: &str) -> Result<Option<f64>> {
    let entries = normalize_history(history, field, TimestampPolicy::Strict)?;
    let Some(latest) = entries.last() else {
        return Ok(None);
    };

    let raw = leading_event(latest).and_then(|event| event.to_value.as_deref());
    let seconds = match raw.map(str::trim) {
        None | Some("") => 0,
        Some(text) => text.parse::<i64>().map_err(|_| EffortError::InvalidEstimate {
            entry_id: latest.id.clone(),
            value: text.to_string(),
        })?,
    };

    Ok(Some(seconds as f64 / SECONDS_PER_HOUR))
}

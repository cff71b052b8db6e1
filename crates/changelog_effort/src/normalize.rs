//! Reduces an issue's changelog to the chronologically ordered entries touching one field.

use chrono::{DateTime, FixedOffset};
use tracing::warn;

use crate::config::TimestampPolicy;
use crate::error::{EffortError, Result};
use crate::models::{ChangeEvent, HistoryEntry};

/// A history entry reduced to one field's events, with a parsed creation time.
///
/// `items` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEntry {
    pub id: String,
    pub created_at: DateTime<FixedOffset>,
    pub items: Vec<ChangeEvent>,
}

/// Keeps entries with at least one event on `field`, strips the other events and
/// sorts ascending by creation time. Entries with equal timestamps keep their input order.
pub fn normalize_history(
    history: &[HistoryEntry],
    field: &str,
    policy: TimestampPolicy,
) -> Result<Vec<NormalizedEntry>> {
    let mut entries = Vec::new();

    for entry in history {
        if !entry.touches(field) {
            continue;
        }
        let items: Vec<ChangeEvent> = entry
            .items
            .iter()
            .filter(|item| item.field == field)
            .cloned()
            .collect();

        let created_at = match entry.created_at.resolve() {
            Ok(created_at) => created_at,
            Err(source) => {
                let err = EffortError::TimestampParse {
                    entry_id: entry.id.clone(),
                    value: entry.created_at.as_text(),
                    source,
                };
                match policy {
                    TimestampPolicy::Strict => return Err(err),
                    TimestampPolicy::SkipInvalid => {
                        warn!(field, error = %err, "skipping history entry with unparseable timestamp");
                        continue;
                    }
                }
            }
        };

        entries.push(NormalizedEntry {
            id: entry.id.clone(),
            created_at,
            items,
        });
    }

    entries.sort_by_key(|entry| entry.created_at);
    Ok(entries)
}

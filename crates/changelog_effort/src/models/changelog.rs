//! Changelog models: tracker wire records and their validated counterparts.

use chrono::{DateTime, FixedOffset};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{EffortError, Result};

const TRACKER_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Paged changelog block embedded in an issue fetched with `expand=changelog`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawChangelog {
    pub start_at: Option<u64>,
    pub max_results: Option<u64>,
    pub total: Option<u64>,
    #[serde(default)]
    pub histories: Option<Vec<RawHistory>>,
}

/// One changelog record exactly as the tracker returns it; every key may be absent.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawHistory {
    #[serde(default, deserialize_with = "deserialize_string_field")]
    pub id: Option<String>,
    #[serde(default)]
    pub author: Option<Value>,
    pub created: Option<Timestamp>,
    #[serde(default)]
    pub items: Option<Vec<RawChangeItem>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawChangeItem {
    pub field: Option<String>,
    pub fieldtype: Option<String>,
    pub field_id: Option<String>,
    #[serde(rename = "from")]
    pub from_id: Option<String>,
    #[serde(rename = "fromString")]
    pub from_display: Option<String>,
    #[serde(rename = "to")]
    pub to_id: Option<String>,
    #[serde(rename = "toString")]
    pub to_display: Option<String>,
}

/// Creation time of a history entry, either as received or already parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Parsed(DateTime<FixedOffset>),
    Text(String),
}

impl Timestamp {
    /// Parses the timestamp, accepting RFC 3339 and the tracker's `+0000` offset form.
    pub fn resolve(&self) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
        match self {
            Timestamp::Parsed(value) => Ok(*value),
            Timestamp::Text(text) => parse_tracker_datetime(text),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Timestamp::Parsed(value) => value.to_rfc3339(),
            Timestamp::Text(text) => text.clone(),
        }
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Timestamp::Parsed(value)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Timestamp::Text(value.to_string())
    }
}

fn parse_tracker_datetime(value: &str) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
    let trimmed = value.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, TRACKER_DATETIME_FORMAT))
}

/// A single field-level change inside a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub field: String,
    pub from_value: Option<String>,
    pub to_value: Option<String>,
}

impl ChangeEvent {
    pub fn new(
        field: impl Into<String>,
        from_value: Option<&str>,
        to_value: Option<&str>,
    ) -> Self {
        Self {
            field: field.into(),
            from_value: from_value.map(str::to_string),
            to_value: to_value.map(str::to_string),
        }
    }

    pub fn enters(&self, value: &str) -> bool {
        self.to_value.as_deref() == Some(value)
    }

    pub fn leaves(&self, value: &str) -> bool {
        self.from_value.as_deref() == Some(value)
    }
}

/// Validated changelog record: identifier, creation time and changes in received order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub created_at: Timestamp,
    pub items: Vec<ChangeEvent>,
}

impl HistoryEntry {
    pub fn new(id: impl Into<String>, created_at: impl Into<Timestamp>, items: Vec<ChangeEvent>) -> Self {
        Self {
            id: id.into(),
            created_at: created_at.into(),
            items,
        }
    }

    pub fn touches(&self, field: &str) -> bool {
        self.items.iter().any(|item| item.field == field)
    }
}

impl TryFrom<RawHistory> for HistoryEntry {
    type Error = EffortError;

    /// Rejects records without `id` or `created`; items lacking `field` are dropped.
    fn try_from(raw: RawHistory) -> Result<Self> {
        let id = raw.id.ok_or(EffortError::MissingKey {
            entry_id: None,
            key: "id",
        })?;
        let created_at = raw.created.ok_or_else(|| EffortError::MissingKey {
            entry_id: Some(id.clone()),
            key: "created",
        })?;

        let items = raw
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| match item.field {
                Some(field) => Some(ChangeEvent {
                    field,
                    from_value: item.from_display,
                    to_value: item.to_display,
                }),
                None => {
                    debug!(entry = %id, "dropping change item without a field name");
                    None
                }
            })
            .collect();

        Ok(Self {
            id,
            created_at,
            items,
        })
    }
}

impl RawChangelog {
    /// Validates every history record, logging and skipping the ones missing required keys.
    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.histories
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| match HistoryEntry::try_from(raw) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!(error = %err, "skipping malformed history record");
                    None
                }
            })
            .collect()
    }
}

fn deserialize_string_field<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|val| match val {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }))
}

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::changelog::{HistoryEntry, RawChangelog};

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Empty when the payload carries no key; loaders fill it from their own index.
    #[serde(default)]
    pub key: String,
    pub id: Option<String>,
    #[serde(default)]
    pub fields: IssueFields,
    #[serde(default)]
    pub changelog: Option<RawChangelog>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<IssueFieldRef>,
    #[serde(default)]
    pub priority: Option<IssueFieldRef>,
    pub created: Option<String>,
    #[serde(rename = "resolutiondate")]
    pub resolution_date: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum IssueFieldRef {
    Object(IssueFieldPayload),
    Text(String),
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IssueFieldPayload {
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl IssueFieldRef {
    pub fn display_name(&self) -> Option<String> {
        match self {
            IssueFieldRef::Object(payload) => payload.name.clone().or_else(|| payload.id.clone()),
            IssueFieldRef::Text(value) => Some(value.clone()),
        }
    }
}

impl Issue {
    pub fn status_name(&self) -> Option<String> {
        self.fields.status.as_ref().and_then(IssueFieldRef::display_name)
    }

    pub fn priority_name(&self) -> Option<String> {
        self.fields.priority.as_ref().and_then(IssueFieldRef::display_name)
    }

    /// Reads a numeric custom field such as story points; strings holding numbers are accepted.
    pub fn numeric_field(&self, field_id: &str) -> Option<f64> {
        match self.fields.extra.get(field_id)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Validated history entries; an issue fetched without its changelog has none.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.changelog
            .clone()
            .map(RawChangelog::into_entries)
            .unwrap_or_default()
    }
}

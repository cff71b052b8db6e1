mod changelog;
mod issue;

pub use changelog::{ChangeEvent, HistoryEntry, RawChangeItem, RawChangelog, RawHistory, Timestamp};
pub use issue::{Issue, IssueFieldPayload, IssueFieldRef, IssueFields};

//! Phase-duration extraction from issue tracker changelogs.
//!
//! The pipeline per tracked phase is: [`normalize_history`] keeps the entries that
//! touch the phase's field, [`match_intervals`] pairs enter/exit transitions, and
//! [`WorkCalendar`] turns each closed interval into a weekday count.
//! [`summarize_issue`] runs it for every configured phase.

pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod error;
pub mod estimate;
pub mod matcher;
pub mod models;
pub mod normalize;

pub use aggregate::{analyze_phase, summarize_issue, IssueEffortSummary, PhaseEffort};
pub use calendar::{count_weekdays, WorkCalendar};
pub use config::{EffortConfig, TimestampPolicy, TrackedPhase};
pub use error::{EffortError, Result};
pub use estimate::latest_estimate_hours;
pub use matcher::{leading_event, match_intervals, Interval, MatchOutcome};
pub use models::{ChangeEvent, HistoryEntry, Issue, IssueFieldRef, RawChangelog, RawHistory, Timestamp};
pub use normalize::{normalize_history, NormalizedEntry};

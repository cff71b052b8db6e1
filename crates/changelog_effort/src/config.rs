use chrono::Weekday;

use crate::calendar::WorkCalendar;

pub const DEFAULT_STATE_FIELD: &str = "status";
pub const DEFAULT_ESTIMATE_FIELD: &str = "timeestimate";

const DEFAULT_PHASES: [(&str, &str); 4] = [
    ("In Progress", "total_in_progress_time"),
    ("Blocked", "total_blocked_time"),
    ("Ready for Testing", "total_ready_for_testing_time"),
    ("In Testing", "total_in_testing_time"),
];

/// How the normalizer treats history entries whose timestamp cannot be parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// Fail the whole batch.
    #[default]
    Strict,
    /// Drop the offending entry and log it.
    SkipInvalid,
}

/// One tracked `(field, value, output key)` triple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedPhase {
    pub field: String,
    pub value: String,
    pub output_key: String,
}

impl TrackedPhase {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<String>,
        output_key: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            output_key: output_key.into(),
        }
    }

    /// Tracks a value of the workflow state field.
    pub fn status(value: impl Into<String>, output_key: impl Into<String>) -> Self {
        Self::new(DEFAULT_STATE_FIELD, value, output_key)
    }
}

#[derive(Clone, Debug)]
pub struct EffortConfig {
    pub phases: Vec<TrackedPhase>,
    pub calendar: WorkCalendar,
    pub timestamp_policy: TimestampPolicy,
    pub estimate_field: Option<String>,
}

impl Default for EffortConfig {
    fn default() -> Self {
        Self {
            phases: DEFAULT_PHASES
                .iter()
                .map(|(value, key)| TrackedPhase::status(*value, *key))
                .collect(),
            calendar: WorkCalendar::default(),
            timestamp_policy: TimestampPolicy::Strict,
            estimate_field: Some(DEFAULT_ESTIMATE_FIELD.to_string()),
        }
    }
}

impl EffortConfig {
    /// Configuration with no tracked phases and no estimate field.
    pub fn empty() -> Self {
        Self {
            phases: Vec::new(),
            calendar: WorkCalendar::default(),
            timestamp_policy: TimestampPolicy::Strict,
            estimate_field: None,
        }
    }

    pub fn with_phase(mut self, phase: TrackedPhase) -> Self {
        self.phases.push(phase);
        self
    }

    pub fn with_phases(mut self, phases: Vec<TrackedPhase>) -> Self {
        self.phases = phases;
        self
    }

    pub fn with_calendar(mut self, calendar: WorkCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_weekend(mut self, weekend: impl IntoIterator<Item = Weekday>) -> Self {
        self.calendar = WorkCalendar::new(weekend);
        self
    }

    pub fn with_timestamp_policy(mut self, policy: TimestampPolicy) -> Self {
        self.timestamp_policy = policy;
        self
    }

    pub fn with_estimate_field(mut self, field: Option<String>) -> Self {
        self.estimate_field = field;
        self
    }

    pub fn output_keys(&self) -> impl Iterator<Item = &str> {
        self.phases.iter().map(|phase| phase.output_key.as_str())
    }
}

//! Per-issue assembly of phase durations.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::calendar::WorkCalendar;
use crate::config::{EffortConfig, TimestampPolicy, TrackedPhase};
use crate::error::{EffortError, Result};
use crate::estimate::latest_estimate_hours;
use crate::matcher::{match_intervals, Interval};
use crate::models::HistoryEntry;
use crate::normalize::normalize_history;

/// Effort derived for one issue. Built once all tracked phases succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueEffortSummary {
    pub issue_key: String,
    pub phase_durations: BTreeMap<String, u32>,
    pub unterminated_intervals: BTreeMap<String, u32>,
    pub estimated_hours: Option<f64>,
}

impl IssueEffortSummary {
    pub fn duration(&self, output_key: &str) -> u32 {
        self.phase_durations.get(output_key).copied().unwrap_or(0)
    }

    pub fn unterminated(&self, output_key: &str) -> u32 {
        self.unterminated_intervals.get(output_key).copied().unwrap_or(0)
    }
}

/// Diagnostic breakdown of a single tracked phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseEffort {
    pub output_key: String,
    pub intervals: Vec<Interval>,
    /// Weekdays per interval, aligned with `intervals`; `None` for unterminated ones.
    pub interval_weekdays: Vec<Option<u32>>,
    pub total_weekdays: u32,
}

impl PhaseEffort {
    pub fn unterminated_count(&self) -> u32 {
        self.intervals.iter().filter(|interval| !interval.is_closed()).count() as u32
    }
}

/// Normalizes, matches and sums one `(field, value)` triple.
pub fn analyze_phase(
    history: &[HistoryEntry],
    phase: &TrackedPhase,
    calendar: &WorkCalendar,
    policy: TimestampPolicy,
) -> Result<PhaseEffort> {
    let entries = normalize_history(history, &phase.field, policy)?;
    let outcome = match_intervals(&entries, &phase.value);

    let mut interval_weekdays = Vec::with_capacity(outcome.intervals.len());
    let mut total_weekdays = 0u32;
    for interval in &outcome.intervals {
        let weekdays = match interval.ended_at {
            Some(ended_at) => Some(calendar.weekdays_between(interval.started_at, ended_at)?),
            None => None,
        };
        total_weekdays += weekdays.unwrap_or(0);
        interval_weekdays.push(weekdays);
    }

    Ok(PhaseEffort {
        output_key: phase.output_key.clone(),
        intervals: outcome.intervals,
        interval_weekdays,
        total_weekdays,
    })
}

/// Runs every tracked phase for one issue.
///
/// The first failing phase aborts the whole summary; no partial result is returned.
pub fn summarize_issue(
    issue_key: &str,
    history: &[HistoryEntry],
    config: &EffortConfig,
) -> Result<IssueEffortSummary> {
    let mut phase_durations = BTreeMap::new();
    let mut unterminated_intervals = BTreeMap::new();

    for phase in &config.phases {
        let effort = analyze_phase(history, phase, &config.calendar, config.timestamp_policy)
            .map_err(|err| {
                EffortError::aggregation(issue_key, &phase.output_key, &phase.field, &phase.value, err)
            })?;

        *phase_durations.entry(phase.output_key.clone()).or_insert(0) += effort.total_weekdays;
        *unterminated_intervals.entry(phase.output_key.clone()).or_insert(0) +=
            effort.unterminated_count();
    }

    let estimated_hours = match &config.estimate_field {
        Some(field) => match latest_estimate_hours(history, field) {
            Ok(hours) => hours,
            // The latest estimate cannot be picked once an entry's time is unknown.
            Err(err @ EffortError::TimestampParse { .. })
                if config.timestamp_policy == TimestampPolicy::SkipInvalid =>
            {
                warn!(issue = issue_key, field = field.as_str(), error = %err, "estimate left empty");
                None
            }
            Err(err) => return Err(EffortError::aggregation(issue_key, field, field, "", err)),
        },
        None => None,
    };

    debug!(issue = issue_key, phases = config.phases.len(), "issue summarized");

    Ok(IssueEffortSummary {
        issue_key: issue_key.to_string(),
        phase_durations,
        unterminated_intervals,
        estimated_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeEvent;

    fn status(id: &str, created: &str, from: &str, to: &str) -> HistoryEntry {
        HistoryEntry::new(id, created, vec![ChangeEvent::new("status", Some(from), Some(to))])
    }

    fn sample_history() -> Vec<HistoryEntry> {
        vec![
            // Mon -> Wed in progress, Wed -> Fri blocked, Fri -> next Mon in progress.
            status("1", "2024-03-04T09:00:00.000+0000", "To Do", "In Progress"),
            status("2", "2024-03-06T09:00:00.000+0000", "In Progress", "Blocked"),
            status("3", "2024-03-08T09:00:00.000+0000", "Blocked", "In Progress"),
            status("4", "2024-03-11T09:00:00.000+0000", "In Progress", "Ready for Testing"),
            HistoryEntry::new(
                "5",
                "2024-03-05T12:00:00.000+0000",
                vec![ChangeEvent::new("timeestimate", Some("28800"), Some("14400"))],
            ),
        ]
    }

    #[test]
    fn sums_closed_intervals_per_phase() {
        let summary = summarize_issue("TMA-1", &sample_history(), &EffortConfig::default()).unwrap();

        assert_eq!(summary.issue_key, "TMA-1");
        // Mon..Wed = 3, Fri..Mon = 2
        assert_eq!(summary.duration("total_in_progress_time"), 5);
        // Wed..Fri = 3
        assert_eq!(summary.duration("total_blocked_time"), 3);
        assert_eq!(summary.duration("total_ready_for_testing_time"), 0);
        assert_eq!(summary.unterminated("total_ready_for_testing_time"), 1);
        assert_eq!(summary.duration("total_in_testing_time"), 0);
        assert_eq!(summary.estimated_hours, Some(4.0));
    }

    #[test]
    fn empty_history_gives_zero_everywhere() {
        let summary = summarize_issue("TMA-2", &[], &EffortConfig::default()).unwrap();
        assert_eq!(summary.phase_durations.len(), 4);
        assert!(summary.phase_durations.values().all(|days| *days == 0));
        assert!(summary.unterminated_intervals.values().all(|count| *count == 0));
        assert_eq!(summary.estimated_hours, None);
    }

    #[test]
    fn failing_phase_fails_the_whole_issue() {
        let mut history = sample_history();
        history.push(HistoryEntry::new(
            "6",
            "broken",
            vec![ChangeEvent::new("resolution", None, Some("Done"))],
        ));
        let config = EffortConfig::default()
            .with_phase(TrackedPhase::new("resolution", "Done", "resolved_time"));

        let err = summarize_issue("TMA-3", &history, &config).unwrap_err();
        match &err {
            EffortError::Aggregation { issue_key, phase, field, .. } => {
                assert_eq!(issue_key, "TMA-3");
                assert_eq!(phase, "resolved_time");
                assert_eq!(field, "resolution");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(err.root_cause(), EffortError::TimestampParse { .. }));
    }

    #[test]
    fn skip_policy_tolerates_bad_timestamps() {
        let mut history = sample_history();
        history.push(status("6", "broken", "Ready for Testing", "In Testing"));
        let config = EffortConfig::default().with_timestamp_policy(TimestampPolicy::SkipInvalid);

        let summary = summarize_issue("TMA-4", &history, &config).unwrap();
        assert_eq!(summary.duration("total_in_progress_time"), 5);
        assert_eq!(summary.unterminated("total_ready_for_testing_time"), 1);
    }

    #[test]
    fn skip_policy_leaves_estimate_empty_when_its_entry_is_undated() {
        let mut history = sample_history();
        history.push(HistoryEntry::new(
            "6",
            "garbage",
            vec![
                ChangeEvent::new("status", Some("Ready for Testing"), Some("Blocked")),
                ChangeEvent::new("timeestimate", None, Some("3600")),
            ],
        ));

        let strict = summarize_issue("TMA-5", &history, &EffortConfig::default()).unwrap_err();
        assert!(matches!(strict.root_cause(), EffortError::TimestampParse { .. }));

        let config = EffortConfig::default().with_timestamp_policy(TimestampPolicy::SkipInvalid);
        let summary = summarize_issue("TMA-5", &history, &config).unwrap();
        assert_eq!(summary.duration("total_in_progress_time"), 5);
        assert_eq!(summary.duration("total_blocked_time"), 3);
        assert_eq!(summary.estimated_hours, None);
    }

    #[test]
    fn skip_policy_still_rejects_non_numeric_estimates() {
        let mut history = sample_history();
        history.push(HistoryEntry::new(
            "6",
            "2024-03-12T09:00:00.000+0000",
            vec![ChangeEvent::new("timeestimate", None, Some("2h"))],
        ));
        let config = EffortConfig::default().with_timestamp_policy(TimestampPolicy::SkipInvalid);

        let err = summarize_issue("TMA-6", &history, &config).unwrap_err();
        assert!(matches!(err.root_cause(), EffortError::InvalidEstimate { .. }));
    }

    #[test]
    fn phase_breakdown_lists_per_interval_weekdays() {
        let phase = TrackedPhase::status("In Progress", "total_in_progress_time");
        let effort = analyze_phase(
            &sample_history(),
            &phase,
            &WorkCalendar::default(),
            TimestampPolicy::Strict,
        )
        .unwrap();
        assert_eq!(effort.interval_weekdays, vec![Some(3), Some(2)]);
        assert_eq!(effort.total_weekdays, 5);
        assert_eq!(effort.unterminated_count(), 0);
    }

    #[test]
    fn summarizing_twice_is_identical() {
        let history = sample_history();
        let config = EffortConfig::default();
        let first = summarize_issue("TMA-5", &history, &config).unwrap();
        let second = summarize_issue("TMA-5", &history, &config).unwrap();
        assert_eq!(first, second);
    }
}

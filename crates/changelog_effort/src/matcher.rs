//! FIFO pairing of "entered value" and "left value" changelog events.

use std::collections::VecDeque;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::debug;

use crate::models::ChangeEvent;
use crate::normalize::NormalizedEntry;

/// One span spent in a phase. `ended_at` is `None` while the span is unterminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub started_at: DateTime<FixedOffset>,
    pub ended_at: Option<DateTime<FixedOffset>>,
}

impl Interval {
    pub fn closed(started_at: DateTime<FixedOffset>, ended_at: DateTime<FixedOffset>) -> Self {
        Self {
            started_at,
            ended_at: Some(ended_at),
        }
    }

    pub fn open(started_at: DateTime<FixedOffset>) -> Self {
        Self {
            started_at,
            ended_at: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Matched intervals in close order, followed by the unterminated ones in entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    pub intervals: Vec<Interval>,
}

impl MatchOutcome {
    pub fn closed(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter().filter(|interval| interval.is_closed())
    }

    pub fn unterminated(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter().filter(|interval| !interval.is_closed())
    }

    pub fn unterminated_count(&self) -> u32 {
        self.unterminated().count() as u32
    }
}

/// The event that drives matching for an entry. Later events on the same field in
/// one entry are ignored.
pub fn leading_event(entry: &NormalizedEntry) -> Option<&ChangeEvent> {
    entry.items.first()
}

/// Pairs each entry into `value` with the oldest pending entry still waiting for an exit.
///
/// Exits with nothing pending and events unrelated to `value` leave the state untouched.
pub fn match_intervals(entries: &[NormalizedEntry], value: &str) -> MatchOutcome {
    let mut pending: VecDeque<DateTime<FixedOffset>> = VecDeque::new();
    let mut intervals = Vec::new();

    for entry in entries {
        let Some(event) = leading_event(entry) else {
            continue;
        };

        if event.enters(value) {
            if !pending.is_empty() {
                debug!(entry = %entry.id, value, "re-entered phase before the previous exit was recorded");
            }
            pending.push_back(entry.created_at);
        } else if event.leaves(value) {
            match pending.pop_front() {
                Some(started_at) => intervals.push(Interval::closed(started_at, entry.created_at)),
                None => debug!(entry = %entry.id, value, "ignoring exit without a pending entry"),
            }
        }
    }

    if !pending.is_empty() {
        debug!(value, count = pending.len(), "phase left unterminated at end of history");
    }
    intervals.extend(pending.into_iter().map(Interval::open));

    MatchOutcome { intervals }
}

//! Weekday arithmetic over inclusive calendar date ranges.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Weekday};

use crate::error::{EffortError, Result};

/// Calendar definition: which days of the week are not working days.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkCalendar {
    weekend: Vec<Weekday>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::new([Weekday::Sat, Weekday::Sun])
    }
}

impl WorkCalendar {
    pub fn new(weekend: impl IntoIterator<Item = Weekday>) -> Self {
        let mut days: Vec<Weekday> = Vec::new();
        for day in weekend {
            if !days.contains(&day) {
                days.push(day);
            }
        }
        Self { weekend: days }
    }

    pub fn weekend(&self) -> &[Weekday] {
        &self.weekend
    }

    pub fn is_weekend(&self, day: Weekday) -> bool {
        self.weekend.contains(&day)
    }

    /// Counts working dates in `[start, end]`; fails when `end` precedes `start`.
    pub fn count_weekdays(&self, start: NaiveDate, end: NaiveDate) -> Result<u32> {
        if end < start {
            return Err(EffortError::invalid_range(start, end));
        }
        let count = start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| !self.is_weekend(day.weekday()))
            .count();
        Ok(count as u32)
    }

    /// Timestamp form: `end` is projected onto `start`'s offset before taking calendar dates.
    pub fn weekdays_between(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<u32> {
        if end < start {
            return Err(EffortError::invalid_range(start.to_rfc3339(), end.to_rfc3339()));
        }
        let end_local = end.with_timezone(start.offset());
        self.count_weekdays(start.date_naive(), end_local.date_naive())
    }
}

/// Weekday count with a Saturday/Sunday weekend.
pub fn count_weekdays(start: NaiveDate, end: NaiveDate) -> Result<u32> {
    WorkCalendar::default().count_weekdays(start, end)
}

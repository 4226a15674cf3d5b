//! Statistics window

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The time range and sampling period a metric query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Sampling period in seconds (CloudWatch requires a multiple of 60)
    pub period_seconds: u32,
}

impl StatisticsWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, period_seconds: u32) -> Self {
        Self {
            start,
            end,
            period_seconds,
        }
    }

    /// Window ending at `end` and reaching `minutes` back.
    pub fn last_minutes(end: DateTime<Utc>, minutes: i64, period_seconds: u32) -> Self {
        Self {
            start: end - Duration::minutes(minutes),
            end,
            period_seconds,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whole-window period for single-datapoint sums, rounded up to the
    /// minute granularity CloudWatch accepts.
    pub fn span_as_period_seconds(&self) -> u32 {
        let secs = (self.end - self.start).num_seconds().max(60);
        let secs = secs as u32;
        secs.div_ceil(60) * 60
    }

    /// Minutes between `at` and the end of the window.
    pub fn minutes_before_end(&self, at: DateTime<Utc>) -> i64 {
        (self.end - at).num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn last_minutes_reaches_back() {
        let w = StatisticsWindow::last_minutes(at(12, 30), 15, 300);
        assert_eq!(w.start, at(12, 15));
        assert_eq!(w.duration_minutes(), 15);
    }

    #[test]
    fn span_rounds_up_to_minute() {
        let w = StatisticsWindow::new(at(12, 0), at(12, 15), 300);
        assert_eq!(w.span_as_period_seconds(), 900);
    }

    #[test]
    fn minutes_before_end() {
        let w = StatisticsWindow::last_minutes(at(12, 30), 60, 300);
        assert_eq!(w.minutes_before_end(at(12, 10)), 20);
    }
}

use std::fmt::Display;

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::format_day;

/// How the current streak treats a day that has no record yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodayPolicy {
    /// The chain has to include today. Nothing logged today means no current streak.
    #[default]
    Strict,
    /// Until something is logged today, the chain may end yesterday.
    Pending,
}

/// Describes when a day starts for a user: `hour` hours after midnight in a fixed `offset`.
///
/// The hour is deliberately an unchecked integer. Values outside `0..=23` (negative included)
/// simply shift the boundary by that many hours, callers validate upstream if they care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
    hour: i32,
    offset: FixedOffset,
    today_policy: TodayPolicy,
}

impl DayBoundary {
    pub fn new(hour: i32, offset: FixedOffset) -> Self {
        Self {
            hour,
            offset,
            today_policy: TodayPolicy::default(),
        }
    }

    /// Boundary measured in UTC.
    pub fn utc(hour: i32) -> Self {
        Self::new(hour, FixedOffset::east_opt(0).expect("zero offset is always valid"))
    }

    pub fn with_today_policy(self, today_policy: TodayPolicy) -> Self {
        Self {
            today_policy,
            ..self
        }
    }

    pub fn hour(&self) -> i32 {
        self.hour
    }

    pub fn offset(&self) -> &FixedOffset {
        &self.offset
    }

    pub fn today_policy(&self) -> TodayPolicy {
        self.today_policy
    }

    /// Maps an instant onto the logical day it belongs to. The instant is moved back by the
    /// boundary hour and truncated to the calendar day in the boundary's offset.
    ///
    /// `None` when the shifted instant falls outside the range of representable dates.
    pub fn normalize(&self, instant: DateTime<Utc>) -> Option<LogicalDay> {
        let local = instant
            .naive_utc()
            .checked_sub_signed(Duration::try_hours(self.hour as i64)?)?
            .checked_add_signed(Duration::try_seconds(self.offset.local_minus_utc() as i64)?)?;
        Some(LogicalDay {
            date: local.date(),
            offset: self.offset,
        })
    }
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::utc(0)
    }
}

/// Calendar day after boundary adjustment. Two records on the same logical day count once.
///
/// Days are compared by date only, all days produced by one [DayBoundary] share its offset.
#[derive(Debug, Clone, Copy)]
pub struct LogicalDay {
    date: NaiveDate,
    offset: FixedOffset,
}

impl LogicalDay {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Signed number of calendar days from `earlier` to `self`.
    pub fn days_since(&self, earlier: &LogicalDay) -> i64 {
        (self.date - earlier.date).num_days()
    }

    pub fn previous(&self) -> Option<LogicalDay> {
        self.date.checked_sub_days(Days::new(1)).map(|date| LogicalDay {
            date,
            offset: self.offset,
        })
    }
}

impl PartialEq for LogicalDay {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
    }
}

impl Eq for LogicalDay {}

impl PartialOrd for LogicalDay {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogicalDay {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.date.cmp(&other.date)
    }
}

impl Display for LogicalDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_day(self.date))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

    use super::DayBoundary;

    #[test]
    fn midnight_boundary_keeps_calendar_day() {
        let boundary = DayBoundary::utc(0);
        let day = boundary.normalize(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()).unwrap();
        assert_eq!(day.date(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn early_hours_belong_to_previous_day() {
        let boundary = DayBoundary::utc(3);
        let before = boundary.normalize(Utc.with_ymd_and_hms(2024, 2, 1, 2, 59, 59).unwrap()).unwrap();
        let after = boundary.normalize(Utc.with_ymd_and_hms(2024, 2, 1, 3, 0, 0).unwrap()).unwrap();
        assert_eq!(before.date(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(after.date(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn late_evening_and_next_morning_share_a_day() {
        let boundary = DayBoundary::utc(10);
        let evening = boundary.normalize(Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0).unwrap()).unwrap();
        let morning = boundary.normalize(Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()).unwrap();
        assert_eq!(evening, morning);
        assert_eq!(morning.date(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn offset_decides_the_calendar() {
        let tokyo = DayBoundary::new(4, FixedOffset::east_opt(9 * 3600).unwrap());
        // 20:00 UTC is 05:00 next morning in Tokyo, past the 4am boundary.
        let day = tokyo.normalize(Utc.with_ymd_and_hms(2024, 2, 1, 20, 0, 0).unwrap()).unwrap();
        assert_eq!(day.date(), NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
    }

    #[test]
    fn out_of_range_hours_shift_arithmetically() {
        let instant = Utc.with_ymd_and_hms(2024, 2, 3, 12, 0, 0).unwrap();
        assert_eq!(
            DayBoundary::utc(36).normalize(instant).unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 2, 2).unwrap()
        );
        assert_eq!(
            DayBoundary::utc(-13).normalize(instant).unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 2, 4).unwrap()
        );
    }

    #[test]
    fn unrepresentable_days_are_none() {
        let earliest = DateTime::<Utc>::MIN_UTC;
        assert!(DayBoundary::utc(3).normalize(earliest).is_none());
        assert!(DayBoundary::utc(0).normalize(earliest).is_some());
        assert!(DayBoundary::utc(-3).normalize(DateTime::<Utc>::MAX_UTC).is_none());
        assert!(DayBoundary::new(0, FixedOffset::east_opt(3600).unwrap())
            .normalize(DateTime::<Utc>::MAX_UTC)
            .is_none());

        // Roughly 245,000 years either way.
        let ancient = Utc.with_ymd_and_hms(-200_000, 1, 1, 0, 0, 0).unwrap();
        let distant = Utc.with_ymd_and_hms(200_000, 1, 1, 0, 0, 0).unwrap();
        assert!(DayBoundary::utc(i32::MAX).normalize(ancient).is_none());
        assert!(DayBoundary::utc(i32::MIN).normalize(distant).is_none());
        assert!(DayBoundary::utc(i32::MAX).normalize(distant).is_some());
    }

    #[test]
    fn day_arithmetic() {
        let boundary = DayBoundary::utc(0);
        let a = boundary.normalize(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()).unwrap();
        let b = boundary.normalize(Utc.with_ymd_and_hms(2024, 2, 28, 12, 0, 0).unwrap()).unwrap();
        assert_eq!(a.days_since(&b), 2);
        assert_eq!(b.days_since(&a), -2);
        assert_eq!(a.previous().unwrap().date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(a.to_string(), "2024-03-01");
    }
}

//! Streak calculation.
//!
//! The calculation is always done from scratch over the full record set:
//!   - Every record is mapped to a logical day using a [DayBoundary].
//!   - Days are deduplicated and sorted.
//!   - The best streak is the longest run of consecutive days.
//!   - The current streak is the run reaching back from today.

pub mod day;
pub mod scan;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::utils::clock::Clock;

pub use day::{DayBoundary, LogicalDay, TodayPolicy};

/// Anything that happened at a point in time. Timestamps are ISO-8601 strings, the way they are
/// stored.
pub trait ActivityRecord {
    fn timestamp(&self) -> &str;
}

impl ActivityRecord for str {
    fn timestamp(&self) -> &str {
        self
    }
}

impl ActivityRecord for String {
    fn timestamp(&self) -> &str {
        self
    }
}

impl<T: ActivityRecord + ?Sized> ActivityRecord for &T {
    fn timestamp(&self) -> &str {
        (**self).timestamp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakResult {
    pub current: u32,
    pub best: u32,
}

/// Calculates streaks as they are at `now`. Never fails: bad timestamps are ignored and an empty
/// history is simply a zero streak.
#[instrument(level = "debug", skip(records), fields(records = records.len()))]
pub fn calculate_streak_at<R: ActivityRecord>(
    records: &[R],
    boundary: &DayBoundary,
    now: DateTime<Utc>,
) -> StreakResult {
    let days = scan::logical_days(records, boundary);
    if days.is_empty() {
        return StreakResult::default();
    }

    let Some(today) = boundary.normalize(now) else {
        warn!("Can't place {now} into a day, reporting no streak");
        return StreakResult::default();
    };
    let result = StreakResult {
        current: scan::current_streak(&days, today, boundary.today_policy()),
        best: scan::best_streak(&days),
    };
    debug_assert!(result.best >= result.current);
    debug!("Found {} distinct days, streak {:?}", days.len(), result);
    result
}

/// Streak calculator bound to a user's day boundary and a source of the current time.
pub struct StreakEngine {
    boundary: DayBoundary,
    clock: Box<dyn Clock>,
}

impl StreakEngine {
    pub fn new(boundary: DayBoundary, clock: Box<dyn Clock>) -> Self {
        Self { boundary, clock }
    }

    pub fn boundary(&self) -> &DayBoundary {
        &self.boundary
    }

    /// Logical day the engine's clock is currently in.
    pub fn today(&self) -> Option<LogicalDay> {
        self.boundary.normalize(self.clock.time())
    }

    pub fn calculate<R: ActivityRecord>(&self, records: &[R]) -> StreakResult {
        calculate_streak_at(records, &self.boundary, self.clock.time())
    }
}

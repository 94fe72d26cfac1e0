use std::collections::BTreeSet;

use tracing::{trace, warn};

use crate::utils::time::parse_timestamp;

use super::{
    day::{DayBoundary, LogicalDay, TodayPolicy},
    ActivityRecord,
};

/// Distinct logical days of `records` in ascending order. Records with unparseable timestamps
/// or with days outside the representable range are skipped, bad rows coming from storage
/// shouldn't hide the rest of the history.
pub fn logical_days<R: ActivityRecord>(records: &[R], boundary: &DayBoundary) -> Vec<LogicalDay> {
    let mut days = BTreeSet::new();
    for record in records {
        let day = parse_timestamp(record.timestamp(), boundary.offset())
            .and_then(|instant| boundary.normalize(instant));
        match day {
            Some(day) => {
                days.insert(day);
            }
            None => trace!("Skipping unusable timestamp {:?}", record.timestamp()),
        }
    }
    days.into_iter().collect()
}

/// Longest run of days that follow each other without a gap.
///
/// `days` has to be sorted and free of duplicates, see [logical_days].
pub fn best_streak(days: &[LogicalDay]) -> u32 {
    let mut best = 0;
    let mut rolling = 0;
    let mut previous: Option<&LogicalDay> = None;
    for day in days {
        rolling = match previous {
            Some(previous) if day.days_since(previous) == 1 => rolling + 1,
            _ => 1,
        };
        previous = Some(day);
        best = u32::max(best, rolling);
    }
    best
}

/// Length of the run that ends at `today`, counted backwards over sorted distinct `days`.
///
/// Days newer than `today` can only come from clocks that disagree with ours. They never count
/// towards the run and are reported with a warning.
pub fn current_streak(days: &[LogicalDay], today: LogicalDay, policy: TodayPolicy) -> u32 {
    let mut expected = match policy {
        TodayPolicy::Pending if !days.contains(&today) => match today.previous() {
            Some(yesterday) => yesterday,
            None => return 0,
        },
        TodayPolicy::Pending | TodayPolicy::Strict => today,
    };

    let mut current = 0;
    for day in days.iter().rev() {
        if *day == expected {
            current += 1;
            match expected.previous() {
                Some(previous) => expected = previous,
                None => break,
            }
        } else if expected > *day {
            break;
        } else {
            warn!("Record on {day} is newer than {expected}, not counting it towards the streak");
        }
    }
    current
}

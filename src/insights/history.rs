use std::{collections::BTreeMap, fmt::Display};

use chrono::{DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use clap::ValueEnum;
use now::DateTimeNow;
use tracing::trace;

use crate::storage::entities::WeightEntity;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::Daily => write!(f, "daily"),
            Timeframe::Weekly => write!(f, "weekly"),
            Timeframe::Monthly => write!(f, "monthly"),
        }
    }
}

/// Average weight over a day, week or month.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBucket {
    pub start: NaiveDate,
    pub label: String,
    /// Rounded to one decimal.
    pub average: f64,
    pub count: usize,
}

/// Groups measurements into calendar buckets in `offset` and averages each bucket. Buckets are
/// ordered from the oldest. Weeks start on Monday.
pub fn aggregate(
    entries: &[WeightEntity],
    timeframe: Timeframe,
    offset: &FixedOffset,
) -> Vec<HistoryBucket> {
    let mut buckets = BTreeMap::<NaiveDate, (f64, usize)>::new();

    for entry in entries {
        let Some(moment) = entry.moment(offset) else {
            trace!("Skipping entry {} with unreadable date {:?}", entry.id, entry.date);
            continue;
        };
        let Some(start) = bucket_start(moment, timeframe, offset) else {
            trace!("Skipping entry {} outside of the calendar {:?}", entry.id, entry.date);
            continue;
        };
        let bucket = buckets.entry(start).or_insert((0., 0));
        bucket.0 += entry.weight;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(start, (total, count))| HistoryBucket {
            start,
            label: label(start, timeframe),
            average: (total / count as f64 * 10.).round() / 10.,
            count,
        })
        .collect()
}

/// First day of the bucket `moment` falls into. Wall time in `offset` is carried as a UTC value
/// so bucket arithmetic never has to map back through the offset.
fn bucket_start(
    moment: DateTime<Utc>,
    timeframe: Timeframe,
    offset: &FixedOffset,
) -> Option<NaiveDate> {
    let wall = moment
        .naive_utc()
        .checked_add_signed(Duration::try_seconds(offset.local_minus_utc() as i64)?)?;
    let local = Utc.from_utc_datetime(&wall);
    match timeframe {
        Timeframe::Daily => Some(local.beginning_of_day().date_naive()),
        Timeframe::Weekly => {
            let day = local.date_naive();
            day.checked_sub_days(Days::new(day.weekday().num_days_from_monday() as u64))
        }
        Timeframe::Monthly => Some(local.beginning_of_month().date_naive()),
    }
}

fn label(start: NaiveDate, timeframe: Timeframe) -> String {
    match timeframe {
        Timeframe::Daily => start.format("%Y/%m/%d").to_string(),
        Timeframe::Weekly => format!("{} week", start.format("%Y/%m/%d")),
        Timeframe::Monthly => start.format("%Y/%m").to_string(),
    }
}

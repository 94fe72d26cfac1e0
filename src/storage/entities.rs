use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{streak::ActivityRecord, utils::time::parse_timestamp};

/// A single weight measurement as it is kept on disk. `date` is the moment the measurement
/// refers to and stays a string, old or imported rows may hold values that no longer parse.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct WeightEntity {
    pub id: Uuid,
    pub date: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WeightEntity {
    pub fn new(date: DateTime<Utc>, weight: f64, note: Option<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: date.to_rfc3339(),
            weight,
            note: note.filter(|v| !v.trim().is_empty()),
            created_at,
        }
    }

    /// Instant of the measurement, if `date` is readable.
    pub fn moment(&self, offset: &FixedOffset) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date, offset)
    }
}

impl ActivityRecord for WeightEntity {
    fn timestamp(&self) -> &str {
        &self.date
    }
}

/// Orders entries from the newest to the oldest measurement. Unreadable dates go last.
pub fn sort_newest_first(entries: &mut [WeightEntity], offset: &FixedOffset) {
    entries.sort_by_cached_key(|v| std::cmp::Reverse(v.moment(offset)));
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use super::{sort_newest_first, WeightEntity};

    fn entry(date: &str) -> WeightEntity {
        WeightEntity {
            date: date.into(),
            ..WeightEntity::new(Utc::now(), 70., None, Utc::now())
        }
    }

    #[test]
    fn blank_notes_are_dropped() {
        let moment = Utc.with_ymd_and_hms(2024, 2, 1, 7, 0, 0).unwrap();
        let entity = WeightEntity::new(moment, 70.2, Some("  ".into()), moment);
        assert_eq!(entity.note, None);
        assert_eq!(entity.date, "2024-02-01T07:00:00+00:00");
    }

    #[test]
    fn newest_first_with_broken_dates_last() {
        let mut entries = vec![
            entry("2024-02-01T07:00:00Z"),
            entry("broken"),
            entry("2024-02-03T07:00:00Z"),
            entry("2024-02-02"),
        ];
        sort_newest_first(&mut entries, &FixedOffset::east_opt(0).unwrap());
        let dates = entries.iter().map(|v| v.date.as_str()).collect::<Vec<_>>();
        assert_eq!(
            dates,
            vec![
                "2024-02-03T07:00:00Z",
                "2024-02-02",
                "2024-02-01T07:00:00Z",
                "broken"
            ]
        );
    }

    #[test]
    fn serialized_without_empty_note() {
        let moment = Utc.with_ymd_and_hms(2024, 2, 1, 7, 0, 0).unwrap();
        let entity = WeightEntity::new(moment, 70.2, None, moment);
        let json = serde_json::to_string(&entity).unwrap();
        assert!(!json.contains("note"));
        let back: WeightEntity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entity);
    }
}

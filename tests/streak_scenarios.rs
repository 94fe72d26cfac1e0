use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use daystreak::{
    storage::{
        entities::WeightEntity,
        profile::{Profile, ProfileStorage},
        record_storage::{RecordStorage, RecordStorageImpl},
    },
    streak::{calculate_streak_at, DayBoundary, StreakEngine, StreakResult},
    utils::clock::FixedClock,
};
use tempfile::tempdir;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()
}

fn days_ago(days: &[i64]) -> Vec<String> {
    days.iter()
        .map(|v| (now() - Duration::days(*v)).to_rfc3339())
        .collect()
}

#[test]
fn scenario_unbroken_run_reaching_today() {
    let result = calculate_streak_at(&days_ago(&[0, 1, 2, 5]), &DayBoundary::utc(3), now());
    assert!(result.current >= 3);
    assert!(result.best >= 3);
}

#[test]
fn scenario_empty() {
    let records: [&str; 0] = [];
    assert_eq!(
        calculate_streak_at(&records, &DayBoundary::utc(0), now()),
        StreakResult { current: 0, best: 0 }
    );
}

#[test]
fn scenario_single_day() {
    let today = ["2024-02-01T01:00:00Z", "2024-02-01T05:00:00Z"];
    let other = ["2024-01-25T01:00:00Z", "2024-01-25T05:00:00Z"];
    let boundary = DayBoundary::utc(0);
    assert_eq!(
        calculate_streak_at(&today, &boundary, now()),
        StreakResult { current: 1, best: 1 }
    );
    assert_eq!(
        calculate_streak_at(&other, &boundary, now()),
        StreakResult { current: 0, best: 1 }
    );
}

#[test]
fn scenario_gap_before_today_run() {
    assert_eq!(
        calculate_streak_at(&days_ago(&[0, 1, 4]), &DayBoundary::utc(0), now()),
        StreakResult { current: 2, best: 2 }
    );
}

#[test]
fn gap_breaks_best_streak() {
    let records = ["2024-01-10T12:00:00Z", "2024-01-11T12:00:00Z", "2024-01-13T12:00:00Z"];
    assert_eq!(
        calculate_streak_at(&records, &DayBoundary::utc(0), now()).best,
        2
    );
}

/// Small deterministic generator so the property checks below are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn best_is_never_below_current_and_order_is_irrelevant() {
    let mut random = Lcg(7);
    let offsets = [0, 3600 * 9, -3600 * 5, 1800];
    for round in 0..200 {
        let count = random.next() % 25;
        let mut records = (0..count)
            .map(|_| {
                // Up to 20 days in the past and one in the future, at any minute.
                let minutes = (random.next() % (21 * 24 * 60)) as i64;
                (now() + Duration::days(1) - Duration::minutes(minutes)).to_rfc3339()
            })
            .collect::<Vec<_>>();
        let offset = FixedOffset::east_opt(offsets[round % offsets.len()]).unwrap();
        let boundary = DayBoundary::new((random.next() % 24) as i32, offset);

        let result = calculate_streak_at(&records, &boundary, now());
        assert!(result.best >= result.current, "{records:?} {result:?}");

        records.reverse();
        let rotate = records.len() / 2;
        records.rotate_left(rotate);
        assert_eq!(calculate_streak_at(&records, &boundary, now()), result);

        let mut duplicated = records.clone();
        duplicated.extend(records.iter().cloned());
        assert_eq!(calculate_streak_at(&duplicated, &boundary, now()), result);
    }
}

#[tokio::test]
async fn stored_measurements_feed_the_engine() -> Result<()> {
    let dir = tempdir()?;
    let records = RecordStorageImpl::new(dir.path().join("records"))?;
    let profiles = ProfileStorage::new(dir.path().to_owned());

    profiles
        .save(&Profile {
            day_boundary_hour: 4,
            utc_offset: FixedOffset::east_opt(9 * 3600).unwrap(),
            ..Profile::default()
        })
        .await?;

    // 02:30 in Tokyo belongs to the previous day with a 4am boundary.
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let moments = [
        tokyo.with_ymd_and_hms(2024, 1, 30, 21, 0, 0).unwrap(),
        tokyo.with_ymd_and_hms(2024, 2, 1, 2, 30, 0).unwrap(),
        tokyo.with_ymd_and_hms(2024, 2, 1, 7, 0, 0).unwrap(),
    ];
    let entities = moments
        .iter()
        .map(|v| {
            let moment = v.with_timezone(&Utc);
            WeightEntity::new(moment, 70., None, moment)
        })
        .collect();
    records.append(entities).await?;

    let profile = profiles.load().await?;
    let clock_now = tokyo.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap().with_timezone(&Utc);
    let engine = StreakEngine::new(profile.day_boundary(), Box::new(FixedClock(clock_now)));

    assert_eq!(
        engine.calculate(&records.get_all().await?),
        StreakResult { current: 3, best: 3 }
    );
    Ok(())
}

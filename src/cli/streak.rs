use std::io::{self, Write};

use anyhow::Result;
use chrono::FixedOffset;
use clap::Parser;

use crate::{
    insights::Dashboard,
    storage::{profile::Profile, record_storage::RecordStorage},
    streak::{DayBoundary, StreakEngine, StreakResult, TodayPolicy},
    utils::{clock::FixedClock, time::parse_utc_offset},
};

use super::AppContext;

#[derive(Debug, Parser)]
pub struct StreakCommand {
    #[arg(
        long,
        value_parser = clap::value_parser!(u8).range(0..=23),
        help = "Hour at which a day starts. Overrides the profile"
    )]
    boundary_hour: Option<u8>,
    #[arg(
        long,
        value_parser = parse_utc_offset,
        allow_hyphen_values = true,
        help = "Offset days are counted in, like +09:00. Overrides the profile"
    )]
    utc_offset: Option<FixedOffset>,
    #[arg(
        long,
        help = "Keep yesterday's streak until something is logged today (true or false). Overrides the profile"
    )]
    pending_today: Option<bool>,
    #[arg(long, help = "Print the result as JSON")]
    json: bool,
}

impl StreakCommand {
    fn boundary(&self, profile: &Profile) -> DayBoundary {
        let boundary = profile.day_boundary();
        let policy = match self.pending_today {
            Some(true) => TodayPolicy::Pending,
            Some(false) => TodayPolicy::Strict,
            None => boundary.today_policy(),
        };
        DayBoundary::new(
            self.boundary_hour.map_or(boundary.hour(), i32::from),
            self.utc_offset.unwrap_or(*boundary.offset()),
        )
        .with_today_policy(policy)
    }
}

/// Command to process `streak` command. Recomputes the streak from every stored measurement.
pub async fn process_streak_command(context: &AppContext, command: StreakCommand) -> Result<()> {
    let profile = context.profiles.load().await?;
    let boundary = command.boundary(&profile);
    let entries = context.records.get_all().await?;

    let engine = StreakEngine::new(boundary, Box::new(FixedClock(context.clock.time())));
    let result = engine.calculate(&entries);

    let mut stdout = io::stdout().lock();
    if command.json {
        serde_json::to_writer(&mut stdout, &result)?;
        writeln!(stdout)?;
    } else {
        write_streak(&mut stdout, &result, engine.boundary())?;
    }
    Ok(())
}

pub fn write_streak(
    out: &mut impl Write,
    result: &StreakResult,
    boundary: &DayBoundary,
) -> io::Result<()> {
    writeln!(out, "Current streak: {}", days(result.current))?;
    writeln!(out, "Best streak: {}", days(result.best))?;
    writeln!(
        out,
        "Day starts at {:02}:00 ({})",
        boundary.hour(),
        boundary.offset()
    )
}

/// Command to process `summary` command.
pub async fn process_summary_command(context: &AppContext) -> Result<()> {
    let profile = context.profiles.load().await?;
    let entries = context.records.get_all().await?;
    let engine = StreakEngine::new(
        profile.day_boundary(),
        Box::new(FixedClock(context.clock.time())),
    );

    let dashboard = Dashboard::build(&profile, entries, &engine);
    write_summary(&mut io::stdout().lock(), &profile, &dashboard, engine.boundary())?;
    Ok(())
}

pub fn write_summary(
    out: &mut impl Write,
    profile: &Profile,
    dashboard: &Dashboard,
    boundary: &DayBoundary,
) -> io::Result<()> {
    write_streak(out, &dashboard.streak, boundary)?;
    writeln!(out)?;

    match (profile.goal_weight, &dashboard.latest, dashboard.progress) {
        (Some(goal), Some(latest), Some(progress)) => writeln!(
            out,
            "Goal: {:.1} kg, now {:.1} kg ({:.0} done)",
            goal, latest.weight, progress
        )?,
        _ => writeln!(out, "Set a goal weight with `profile set --goal-weight` to track progress")?,
    }
    writeln!(out, "Hint: {}", dashboard.hint)?;

    if !dashboard.recent.is_empty() {
        writeln!(out)?;
        writeln!(out, "Latest entries:")?;
        for entry in &dashboard.recent {
            let date = entry
                .moment(&profile.utc_offset)
                .map(|v| {
                    v.with_timezone(&profile.utc_offset)
                        .format("%m/%d %H:%M")
                        .to_string()
                })
                .unwrap_or_else(|| entry.date.clone());
            match &entry.note {
                Some(note) => writeln!(out, "{date}\t{:.1} kg\t{note}", entry.weight)?,
                None => writeln!(out, "{date}\t{:.1} kg", entry.weight)?,
            }
        }
    }
    Ok(())
}

fn days(value: u32) -> String {
    if value == 1 {
        "1 day".into()
    } else {
        format!("{value} days")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use crate::{
        insights::Dashboard,
        storage::{entities::WeightEntity, profile::Profile},
        streak::{DayBoundary, StreakEngine, StreakResult, TodayPolicy},
        utils::clock::FixedClock,
    };

    use super::{write_streak, write_summary, StreakCommand};

    fn command(boundary_hour: Option<u8>, pending_today: Option<bool>) -> StreakCommand {
        StreakCommand {
            boundary_hour,
            utc_offset: None,
            pending_today,
            json: false,
        }
    }

    #[test]
    fn command_overrides_profile() {
        let profile = Profile {
            day_boundary_hour: 4,
            utc_offset: FixedOffset::east_opt(3600).unwrap(),
            ..Profile::default()
        };

        let boundary = command(None, None).boundary(&profile);
        assert_eq!(boundary.hour(), 4);
        assert_eq!(boundary.today_policy(), TodayPolicy::Strict);

        let boundary = command(Some(0), Some(true)).boundary(&profile);
        assert_eq!(boundary.hour(), 0);
        assert_eq!(boundary.offset().local_minus_utc(), 3600);
        assert_eq!(boundary.today_policy(), TodayPolicy::Pending);
    }

    #[test]
    fn command_can_turn_pending_today_off() {
        let profile = Profile {
            pending_today: true,
            ..Profile::default()
        };
        assert_eq!(
            command(None, None).boundary(&profile).today_policy(),
            TodayPolicy::Pending
        );
        assert_eq!(
            command(None, Some(false)).boundary(&profile).today_policy(),
            TodayPolicy::Strict
        );
    }

    #[test]
    fn streak_output() {
        let mut out = Vec::new();
        let boundary = DayBoundary::new(4, FixedOffset::east_opt(9 * 3600).unwrap());
        write_streak(&mut out, &StreakResult { current: 1, best: 12 }, &boundary).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Current streak: 1 day\nBest streak: 12 days\nDay starts at 04:00 (+09:00)\n"
        );
    }

    #[test]
    fn summary_output() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let profile = Profile {
            goal_weight: Some(60.),
            ..Profile::default()
        };
        let entries = vec![
            WeightEntity::new(now - chrono::Duration::days(1), 70., None, now),
            WeightEntity::new(now, 65., Some("after run".into()), now),
        ];
        let engine = StreakEngine::new(profile.day_boundary(), Box::new(FixedClock(now)));
        let dashboard = Dashboard::build(&profile, entries, &engine);

        let mut out = Vec::new();
        write_summary(&mut out, &profile, &dashboard, engine.boundary()).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("Current streak: 2 days\nBest streak: 2 days\n"));
        assert!(out.contains("Goal: 60.0 kg, now 65.0 kg (50% done)"));
        assert!(out.contains("02/01 09:00\t65.0 kg\tafter run\n"));
        assert!(out.contains("01/31 09:00\t70.0 kg\n"));
    }
}

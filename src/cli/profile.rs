use std::io::{self, Write};

use anyhow::Result;
use chrono::{FixedOffset, Local, Offset};
use clap::{Args as ClapArgs, Subcommand};

use crate::{
    storage::profile::{HintMode, Profile},
    utils::time::parse_utc_offset,
};

use super::AppContext;

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    #[command(about = "Print current settings")]
    Show,
    #[command(about = "Change settings. Unspecified values are kept")]
    Set(ProfileChanges),
}

#[derive(ClapArgs, Debug, Default)]
pub struct ProfileChanges {
    #[arg(long, help = "Goal weight in kilograms")]
    goal_weight: Option<f64>,
    #[arg(long, help = "Forget the goal weight", conflicts_with = "goal_weight")]
    clear_goal: bool,
    #[arg(long, help = "Height in centimeters")]
    height: Option<f64>,
    #[arg(long, help = "Which meal hints to show")]
    hint_mode: Option<HintMode>,
    #[arg(
        long,
        value_parser = clap::value_parser!(u8).range(0..=23),
        help = "Hour at which a new day starts, 0-23"
    )]
    boundary_hour: Option<u8>,
    #[arg(
        long,
        value_parser = parse_offset_or_local,
        allow_hyphen_values = true,
        help = "Offset days are counted in, like +09:00. \"local\" takes the offset of this machine right now"
    )]
    utc_offset: Option<FixedOffset>,
    #[arg(long, help = "Keep yesterday's streak until something is logged today")]
    pending_today: Option<bool>,
}

impl ProfileChanges {
    fn apply(self, mut profile: Profile) -> Profile {
        if self.clear_goal {
            profile.goal_weight = None;
        }
        if let Some(goal_weight) = self.goal_weight {
            profile.goal_weight = Some(goal_weight);
        }
        if let Some(height) = self.height {
            profile.height = Some(height);
        }
        if let Some(hint_mode) = self.hint_mode {
            profile.hint_mode = hint_mode;
        }
        if let Some(hour) = self.boundary_hour {
            profile.day_boundary_hour = hour;
        }
        if let Some(offset) = self.utc_offset {
            profile.utc_offset = offset;
        }
        if let Some(pending_today) = self.pending_today {
            profile.pending_today = pending_today;
        }
        profile
    }
}

fn parse_offset_or_local(value: &str) -> Result<FixedOffset> {
    if value.eq_ignore_ascii_case("local") {
        Ok(Local::now().offset().fix())
    } else {
        parse_utc_offset(value)
    }
}

/// Command to process `profile` command.
pub async fn process_profile_command(context: &AppContext, command: ProfileCommand) -> Result<()> {
    let profile = context.profiles.load().await?;
    let profile = match command {
        ProfileCommand::Show => profile,
        ProfileCommand::Set(changes) => {
            let profile = changes.apply(profile);
            context.profiles.save(&profile).await?;
            profile
        }
    };
    write_profile(&mut io::stdout().lock(), &profile)?;
    Ok(())
}

fn write_profile(out: &mut impl Write, profile: &Profile) -> io::Result<()> {
    writeln!(out, "Goal weight: {}", or_not_set(profile.goal_weight, "kg"))?;
    writeln!(out, "Height: {}", or_not_set(profile.height, "cm"))?;
    writeln!(out, "Hint mode: {}", profile.hint_mode)?;
    writeln!(out, "Day starts at: {:02}:00", profile.day_boundary_hour)?;
    writeln!(out, "UTC offset: {}", profile.utc_offset)?;
    writeln!(out, "Pending today: {}", profile.pending_today)
}

fn or_not_set(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "not set".to_string(), |v| format!("{v:.1} {unit}"))
}

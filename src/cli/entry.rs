use std::fmt::Display;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use tracing::info;
use uuid::Uuid;

use crate::storage::{entities::WeightEntity, record_storage::RecordStorage};

use super::{AppContext, Args};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct LogCommand {
    #[arg(help = "Weight in kilograms")]
    weight: f64,
    #[arg(
        long,
        short,
        help = "When the measurement was taken. Examples are \"yesterday\", \"2 hours ago\", \"15/03/2025\", \"07:30 16/03/2025\". Defaults to now"
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, short, help = "Free-form note")]
    note: Option<String>,
}

/// Command to process `log` command. Adds a single measurement to the store.
pub async fn process_log_command(
    context: &AppContext,
    LogCommand {
        weight,
        date,
        date_style,
        note,
    }: LogCommand,
) -> Result<()> {
    if !weight.is_finite() || weight <= 0. {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Weight should be a positive number, got {weight}"),
            )
            .into());
    }

    let profile = context.profiles.load().await?;
    let now = context.clock.time();
    let moment = match date {
        Some(date) => parse_moment(&date, now, &profile.utc_offset, date_style)?,
        None => now,
    };

    let entity = WeightEntity::new(moment, weight, note, now);
    context.records.append(vec![entity.clone()]).await?;
    info!("Logged {entity:?}");

    println!(
        "Logged {:.1} kg at {} ({})",
        entity.weight,
        moment.with_timezone(&profile.utc_offset).format("%Y-%m-%d %H:%M"),
        entity.id
    );
    Ok(())
}

fn parse_moment(
    value: &str,
    now: DateTime<Utc>,
    offset: &chrono::FixedOffset,
    date_style: DateStyle,
) -> Result<DateTime<Utc>> {
    match parse_date_string(value, now.with_timezone(offset), date_style.into()) {
        Ok(v) => Ok(v.with_timezone(&Utc)),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
    }
}

pub async fn process_remove_command(context: &AppContext, id: Uuid) -> Result<()> {
    if !context.records.remove(id).await? {
        bail!("No measurement with id {id}");
    }
    println!("Removed {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use super::{parse_moment, DateStyle};

    #[test]
    fn relative_dates_use_profile_offset() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 20, 0, 0).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let moment = parse_moment("15/03/2024", now, &tokyo, DateStyle::Uk).unwrap();
        assert_eq!(
            moment.with_timezone(&tokyo).date_naive(),
            chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn nonsense_dates_are_rejected() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 20, 0, 0).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        assert!(parse_moment("banana", now, &utc, DateStyle::Us).is_err());
    }
}

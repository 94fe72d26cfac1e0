use std::{fmt::Display, io::ErrorKind, path::PathBuf};

use anyhow::{bail, Context, Result};
use chrono::FixedOffset;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::streak::{DayBoundary, TodayPolicy};

const PROFILE_FILE_NAME: &str = "profile.json";

/// Which set of meal hints the user wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum HintMode {
    Light,
    #[default]
    Maintain,
    Active,
}

impl Display for HintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HintMode::Light => write!(f, "light"),
            HintMode::Maintain => write!(f, "maintain"),
            HintMode::Active => write!(f, "active"),
        }
    }
}

/// User settings. Missing fields fall back to defaults so that older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub goal_weight: Option<f64>,
    pub hint_mode: HintMode,
    /// Hour at which a new day starts, `0..=23`.
    pub day_boundary_hour: u8,
    /// Height in centimeters.
    pub height: Option<f64>,
    #[serde(with = "offset_ser")]
    pub utc_offset: FixedOffset,
    /// Keep yesterday's streak alive until something is logged today.
    pub pending_today: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            goal_weight: None,
            hint_mode: HintMode::default(),
            day_boundary_hour: 0,
            height: None,
            utc_offset: FixedOffset::east_opt(0).expect("zero offset is always valid"),
            pending_today: false,
        }
    }
}

impl Profile {
    pub fn validate(&self) -> Result<()> {
        if self.day_boundary_hour > 23 {
            bail!(
                "Day boundary hour should be between 0 and 23, got {}",
                self.day_boundary_hour
            );
        }
        if let Some(goal) = self.goal_weight.filter(|v| v.is_nan() || *v <= 0.) {
            bail!("Goal weight should be positive, got {goal}");
        }
        if let Some(height) = self.height.filter(|v| v.is_nan() || *v <= 0.) {
            bail!("Height should be positive, got {height}");
        }
        Ok(())
    }

    pub fn day_boundary(&self) -> DayBoundary {
        let policy = if self.pending_today {
            TodayPolicy::Pending
        } else {
            TodayPolicy::Strict
        };
        DayBoundary::new(self.day_boundary_hour as i32, self.utc_offset).with_today_policy(policy)
    }
}

mod offset_ser {
    use chrono::FixedOffset;
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    use crate::utils::time::parse_utc_offset;

    pub fn serialize<S>(offset: &FixedOffset, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&offset.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<FixedOffset, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_utc_offset(&s).map_err(D::Error::custom)
    }
}

/// Keeps the profile as pretty JSON next to the records.
pub struct ProfileStorage {
    path: PathBuf,
}

impl ProfileStorage {
    pub fn new(application_dir: PathBuf) -> Self {
        Self {
            path: application_dir.join(PROFILE_FILE_NAME),
        }
    }

    /// Returns the stored profile, or the default one when nothing was saved yet.
    pub async fn load(&self) -> Result<Profile> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let profile = serde_json::from_str::<Profile>(&content)
                    .with_context(|| format!("Failed to parse profile {:?}", self.path))?;
                debug!("Loaded profile {profile:?}");
                Ok(profile)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No profile at {:?}, using defaults", self.path);
                Ok(Profile::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read profile {:?}", self.path)),
        }
    }

    /// Validates and writes the profile. The file is replaced atomically.
    pub async fn save(&self, profile: &Profile) -> Result<()> {
        profile.validate()?;
        let content = serde_json::to_string_pretty(profile)?;
        let temporary = self.path.with_extension("json.tmp");
        tokio::fs::write(&temporary, content).await?;
        tokio::fs::rename(&temporary, &self.path).await?;
        info!("Saved profile {profile:?}");
        Ok(())
    }
}

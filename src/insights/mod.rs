//! Everything shown next to the streak: goal progress, meal hints and averaged history.

pub mod hint;
pub mod history;
pub mod progress;

use crate::{
    storage::{
        entities::{sort_newest_first, WeightEntity},
        profile::Profile,
    },
    streak::{StreakEngine, StreakResult},
    utils::percentage::Percentage,
};

const RECENT_ENTRIES: usize = 3;

/// Snapshot of the user's state, the way the summary screen shows it.
#[derive(Debug)]
pub struct Dashboard {
    pub streak: StreakResult,
    pub latest: Option<WeightEntity>,
    pub progress: Option<Percentage>,
    pub hint: &'static str,
    pub recent: Vec<WeightEntity>,
}

impl Dashboard {
    pub fn build(profile: &Profile, mut entries: Vec<WeightEntity>, engine: &StreakEngine) -> Self {
        let streak = engine.calculate(&entries);

        sort_newest_first(&mut entries, &profile.utc_offset);
        let latest = entries.first().cloned();
        let base = entries.last().map(|v| v.weight);

        let progress = match (profile.goal_weight, base, &latest) {
            (Some(goal), Some(base), Some(latest)) => {
                Some(progress::goal_progress(goal, base, latest.weight))
            }
            _ => None,
        };
        let hint = hint::pick_hint(
            profile.hint_mode,
            profile.goal_weight,
            latest.as_ref().map(|v| v.weight),
        );

        entries.truncate(RECENT_ENTRIES);

        Self {
            streak,
            latest,
            progress,
            hint,
            recent: entries,
        }
    }
}

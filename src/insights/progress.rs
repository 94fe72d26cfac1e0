use crate::utils::percentage::Percentage;

/// How far `latest` has moved from `base` towards `goal`.
///
/// Moving away from the goal is 0%, overshooting it is 100%. When the first measurement already
/// was the goal there is nothing left to do, so that counts as done.
pub fn goal_progress(goal: f64, base: f64, latest: f64) -> Percentage {
    let total = goal - base;
    if total == 0. {
        return Percentage::clamped(100.);
    }
    Percentage::clamped((latest - base) / total * 100.)
}

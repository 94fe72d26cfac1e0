use crate::storage::profile::HintMode;

pub const NO_DATA_HINT: &str = "Log your first weight to see today's hint.";

const LIGHT_HINTS: [&str; 2] = [
    "Almost there. Go easy on carbs in the evening and build dinner around protein.",
    "Keep an eye on hydration and swap snacks for fruit or yoghurt.",
];

const MAINTAIN_HINTS: [&str; 2] = [
    "Keep meals balanced. Colourful vegetables and some protein keep you full.",
    "Simply writing down what you eat and watching the daily total goes a long way.",
];

const ACTIVE_HINTS: [&str; 2] = [
    "Have proper carbs at breakfast, then protein and vitamins at lunch to refuel.",
    "Around workouts, pair fast carbs with protein to get more out of training.",
];

fn hints_for(mode: HintMode) -> &'static [&'static str] {
    match mode {
        HintMode::Light => &LIGHT_HINTS,
        HintMode::Maintain => &MAINTAIN_HINTS,
        HintMode::Active => &ACTIVE_HINTS,
    }
}

/// Picks a meal hint. The choice rotates with the whole kilograms left to the goal, so it
/// changes as the user makes progress.
pub fn pick_hint(mode: HintMode, goal: Option<f64>, latest: Option<f64>) -> &'static str {
    let Some(latest) = latest else {
        return NO_DATA_HINT;
    };
    let options = hints_for(mode);
    let difference = goal.map(|goal| goal - latest).unwrap_or(0.);
    // Halves round up, so -2.5 becomes -2.
    let rounded = (difference + 0.5).floor().abs() as usize;
    options[usize::min(options.len() - 1, rounded % options.len())]
}

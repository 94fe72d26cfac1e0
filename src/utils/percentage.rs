use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*}%", precision, self.0),
            None => write!(f, "{}%", self.0),
        }
    }
}

impl Percentage {
    /// Squeezes any ratio into `0..=100`. NaN is treated as no progress.
    pub fn clamped(value: f64) -> Percentage {
        if value.is_nan() {
            Percentage(0.)
        } else {
            Percentage(value.clamp(0., 100.))
        }
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

//! Progress value object (0.0-1.0 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline completion as a fraction between 0 and 1 inclusive.
///
/// Construction always clamps, so a stored value can never leave the range.
/// Deserialization goes through the same clamp.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Progress(f64);

impl Progress {
    /// Nothing done yet.
    pub const ZERO: Self = Self(0.0);

    /// Fully done.
    pub const COMPLETE: Self = Self(1.0);

    /// Creates a new Progress, clamping to the valid range.
    ///
    /// NaN is treated as zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the fraction.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the value as a whole percentage (0 to 100).
    pub fn as_percent(&self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Progress {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Progress> for f64 {
    fn from(progress: Progress) -> Self {
        progress.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

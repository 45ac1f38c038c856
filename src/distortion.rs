//! Distortion severity scale for ratio differences.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal label for how far an image would be stretched into a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distortion {
    Negligible,
    Slight,
    Moderate,
    Noticeable,
    Severe,
    /// No single target ratio exists (continuous-range scenes).
    NotApplicable,
}

// Upper bounds, inclusive, checked in ascending order.
const BREAKPOINTS: [(f64, Distortion); 4] = [
    (0.02, Distortion::Negligible),
    (0.05, Distortion::Slight),
    (0.10, Distortion::Moderate),
    (0.20, Distortion::Noticeable),
];

impl Distortion {
    /// Maps a relative ratio difference onto the scale.
    pub fn from_difference(difference: f64) -> Self {
        BREAKPOINTS
            .iter()
            .find(|(bound, _)| difference <= *bound)
            .map(|&(_, level)| level)
            .unwrap_or(Distortion::Severe)
    }

    pub fn label(self) -> &'static str {
        match self {
            Distortion::Negligible => "negligible",
            Distortion::Slight => "slight",
            Distortion::Moderate => "moderate",
            Distortion::Noticeable => "noticeable",
            Distortion::Severe => "severe",
            Distortion::NotApplicable => "not applicable",
        }
    }
}

impl fmt::Display for Distortion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

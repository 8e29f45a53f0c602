//! # Score Module
//!
//! Classifier probabilities held as integer parts-per-million.
//!
//! Classifiers report `f64` probabilities. They are converted exactly once,
//! at the boundary, into a [`Score`]. Every threshold comparison, boost and
//! ranking inside the cascade then runs on integers, so the same classifier
//! output always produces the same decision.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One million: the ppm denominator.
pub const PPM: u32 = 1_000_000;

/// A probability in parts-per-million (0..=1_000_000).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(u32);

impl Score {
    /// Zero probability.
    pub const ZERO: Self = Self(0);

    /// Probability one.
    pub const ONE: Self = Self(PPM);

    /// Create a score from a raw ppm value, clamped to `PPM`.
    #[must_use]
    pub const fn from_ppm(ppm: u32) -> Self {
        if ppm > PPM { Self(PPM) } else { Self(ppm) }
    }

    /// Convert a classifier probability into a score.
    ///
    /// Values are clamped to `[0, 1]` and rounded to the nearest ppm.
    /// `NaN` becomes zero.
    #[must_use]
    #[allow(clippy::float_arithmetic)]
    pub fn from_probability(p: f64) -> Self {
        if p.is_nan() || p <= 0.0 {
            return Self::ZERO;
        }
        if p >= 1.0 {
            return Self::ONE;
        }
        Self((p * f64::from(PPM)).round() as u32)
    }

    /// The score as a probability in `[0, 1]`.
    #[must_use]
    #[allow(clippy::float_arithmetic)]
    pub fn as_probability(self) -> f64 {
        f64::from(self.0) / f64::from(PPM)
    }

    /// Raw ppm value.
    #[must_use]
    pub const fn ppm(self) -> u32 {
        self.0
    }

    /// Add two scores, saturating at `PPM`.
    ///
    /// A boosted score may not exceed probability one.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self::from_ppm(self.0.saturating_add(other.0))
    }

    /// Subtract, stopping at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiply by another score treated as a factor (`self * factor / 1e6`).
    #[must_use]
    pub const fn scaled(self, factor: Self) -> Self {
        let product = (self.0 as u64) * (factor.0 as u64) / (PPM as u64);
        Self(product as u32)
    }

    /// Percentage with one decimal place, e.g. `"45.0%"`.
    ///
    /// Rounds half up at the tenth of a percent.
    #[must_use]
    pub fn percent_string(self) -> String {
        // one tenth of a percent is 1000 ppm
        let tenths = (self.0 + 500) / 1000;
        format!("{}.{}%", tenths / 10, tenths % 10)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.percent_string())
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_probability())
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let p = f64::deserialize(deserializer)?;
        Ok(Self::from_probability(p))
    }
}

// =============================================================================
// TESTS
// =============================================================================

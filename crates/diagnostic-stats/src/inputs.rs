use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{DiagnosticError, Result};
use crate::nan::null_as_nan;

/// Granularity of the probability controls a front end exposes.
pub const PROBABILITY_STEP: f64 = 0.01;

/// Valid range for sensitivity, specificity and prevalence.
pub const PROBABILITY_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// The four caller-supplied parameters of a diagnostic test simulation.
///
/// Construction through a struct literal or [`DiagnosticInputs::new`] performs
/// no validation; use [`DiagnosticInputs::validated`] or
/// [`DiagnosticInputs::clamped`] when the values come from an untrusted source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticInputs {
    /// True positive rate (0.0 to 1.0)
    #[serde(deserialize_with = "null_as_nan")]
    pub sensitivity: f64,
    /// True negative rate (0.0 to 1.0)
    #[serde(deserialize_with = "null_as_nan")]
    pub specificity: f64,
    /// Fraction of the population with the condition (0.0 to 1.0)
    #[serde(deserialize_with = "null_as_nan")]
    pub prevalence: f64,
    pub population_size: u64,
}

impl Default for DiagnosticInputs {
    fn default() -> Self {
        Self {
            sensitivity: 0.9,
            specificity: 0.9,
            prevalence: 0.1,
            population_size: 1000,
        }
    }
}

impl DiagnosticInputs {
    pub fn new(sensitivity: f64, specificity: f64, prevalence: f64, population_size: u64) -> Self {
        Self {
            sensitivity,
            specificity,
            prevalence,
            population_size,
        }
    }

    /// Build inputs, rejecting probabilities that are NaN, infinite or outside [0, 1].
    pub fn validated(
        sensitivity: f64,
        specificity: f64,
        prevalence: f64,
        population_size: u64,
    ) -> Result<Self> {
        let inputs = Self::new(sensitivity, specificity, prevalence, population_size);
        inputs.validate()?;
        Ok(inputs)
    }

    /// Build inputs with every probability forced into [0, 1]. NaN maps to 0.
    pub fn clamped(
        sensitivity: f64,
        specificity: f64,
        prevalence: f64,
        population_size: u64,
    ) -> Self {
        let inputs = Self::new(
            clamp_probability(sensitivity),
            clamp_probability(specificity),
            clamp_probability(prevalence),
            population_size,
        );

        if inputs.sensitivity != sensitivity
            || inputs.specificity != specificity
            || inputs.prevalence != prevalence
        {
            tracing::debug!(
                sensitivity,
                specificity,
                prevalence,
                "clamped diagnostic inputs into [0, 1]"
            );
        }

        inputs
    }

    /// Check every probability field against [`PROBABILITY_RANGE`].
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.probabilities() {
            if !value.is_finite() {
                tracing::warn!(field, "rejected non-finite diagnostic input");
                return Err(DiagnosticError::NotFinite { field });
            }
            if !PROBABILITY_RANGE.contains(&value) {
                tracing::warn!(field, value, "rejected out-of-range diagnostic input");
                return Err(DiagnosticError::OutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Population size as the floating-point multiplier used by every count.
    pub fn population(&self) -> f64 {
        self.population_size as f64
    }

    fn probabilities(&self) -> [(&'static str, f64); 3] {
        [
            ("sensitivity", self.sensitivity),
            ("specificity", self.specificity),
            ("prevalence", self.prevalence),
        ]
    }
}

/// Round a probability to the nearest [`PROBABILITY_STEP`] and clamp it into range.
pub fn snap_to_step(value: f64) -> f64 {
    let snapped = (value / PROBABILITY_STEP).round() * PROBABILITY_STEP;
    clamp_probability(snapped)
}

fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(*PROBABILITY_RANGE.start(), *PROBABILITY_RANGE.end())
    }
}

//! Confusion Matrix Calculator
//!
//! Derives expected confusion-matrix counts and the metrics built on them
//! from sensitivity, specificity, prevalence and population size.
//!
//! Zero-denominator handling is deliberately uneven: `accuracy`, `ppv` and
//! `npv` follow IEEE-754 and yield NaN on 0/0, while `f1`, `mcc` and `fdr`
//! return 0. Callers that display these values must be ready for NaN.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::inputs::DiagnosticInputs;
use crate::matrix::ConfusionMatrix;
use crate::nan::null_as_nan;

/// Probabilities are pulled this far away from 0 and 1 before the probit
/// transform so the binormal AUC stays finite.
const PROBIT_EPSILON: f64 = 1e-9;

/// Every metric for one set of inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticMetrics {
    pub matrix: ConfusionMatrix,
    #[serde(deserialize_with = "null_as_nan")]
    pub sensitivity: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub specificity: f64,
    /// NaN when the population is empty
    #[serde(deserialize_with = "null_as_nan")]
    pub accuracy: f64,
    /// NaN when nobody tests positive
    #[serde(deserialize_with = "null_as_nan")]
    pub ppv: f64,
    /// NaN when nobody tests negative
    #[serde(deserialize_with = "null_as_nan")]
    pub npv: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub f1: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub mcc: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub balanced_accuracy: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub fdr: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub auc_approx: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub binormal_auc: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub false_positive_rate: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub false_negative_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrixCalculator {
    inputs: DiagnosticInputs,
}

impl From<DiagnosticInputs> for ConfusionMatrixCalculator {
    fn from(inputs: DiagnosticInputs) -> Self {
        Self { inputs }
    }
}

impl ConfusionMatrixCalculator {
    /// Create a calculator without validating the inputs.
    pub fn new(sensitivity: f64, specificity: f64, prevalence: f64, population_size: u64) -> Self {
        Self::from(DiagnosticInputs::new(
            sensitivity,
            specificity,
            prevalence,
            population_size,
        ))
    }

    pub fn inputs(&self) -> &DiagnosticInputs {
        &self.inputs
    }

    pub fn true_positives(&self) -> f64 {
        let i = &self.inputs;
        i.prevalence * i.sensitivity * i.population()
    }

    pub fn false_positives(&self) -> f64 {
        let i = &self.inputs;
        (1.0 - i.prevalence) * (1.0 - i.specificity) * i.population()
    }

    pub fn true_negatives(&self) -> f64 {
        let i = &self.inputs;
        (1.0 - i.prevalence) * i.specificity * i.population()
    }

    pub fn false_negatives(&self) -> f64 {
        let i = &self.inputs;
        i.prevalence * (1.0 - i.sensitivity) * i.population()
    }

    pub fn confusion_matrix(&self) -> ConfusionMatrix {
        ConfusionMatrix {
            true_positives: self.true_positives(),
            false_positives: self.false_positives(),
            true_negatives: self.true_negatives(),
            false_negatives: self.false_negatives(),
        }
    }

    /// (TP + TN) / N. Unguarded: NaN for an empty population.
    pub fn accuracy(&self) -> f64 {
        (self.true_positives() + self.true_negatives()) / self.inputs.population()
    }

    /// Positive predictive value, TP / (TP + FP). Unguarded.
    pub fn ppv(&self) -> f64 {
        let matrix = self.confusion_matrix();
        matrix.true_positives / matrix.predicted_positive()
    }

    /// Negative predictive value, TN / (TN + FN). Unguarded.
    pub fn npv(&self) -> f64 {
        let matrix = self.confusion_matrix();
        matrix.true_negatives / matrix.predicted_negative()
    }

    /// Harmonic mean of PPV and sensitivity; 0 unless their sum is positive.
    pub fn f1(&self) -> f64 {
        let precision = self.ppv();
        let recall = self.inputs.sensitivity;

        // A NaN precision fails the comparison as well
        if (precision + recall) > 0.0 {
            2.0 * (precision * recall) / (precision + recall)
        } else {
            0.0
        }
    }

    /// Matthews correlation coefficient; 0 when any marginal is empty.
    pub fn mcc(&self) -> f64 {
        let tp = self.true_positives();
        let fp = self.false_positives();
        let tn = self.true_negatives();
        let fn_ = self.false_negatives();

        let numerator = (tp * tn) - (fp * fn_);
        let denominator = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();

        if denominator == 0.0 {
            0.0
        } else {
            numerator / denominator
        }
    }

    pub fn balanced_accuracy(&self) -> f64 {
        (self.inputs.sensitivity + self.inputs.specificity) / 2.0
    }

    /// False discovery rate, FP / (TP + FP); 0 when nobody tests positive.
    pub fn fdr(&self) -> f64 {
        let matrix = self.confusion_matrix();
        let predicted_positive = matrix.predicted_positive();

        if predicted_positive == 0.0 {
            0.0
        } else {
            matrix.false_positives / predicted_positive
        }
    }

    /// Placeholder AUC: currently identical to [`Self::balanced_accuracy`].
    /// See [`Self::binormal_auc`] for a model-based estimate.
    pub fn auc_approx(&self) -> f64 {
        (self.inputs.sensitivity + self.inputs.specificity) / 2.0
    }

    pub fn false_positive_rate(&self) -> f64 {
        1.0 - self.inputs.specificity
    }

    pub fn false_negative_rate(&self) -> f64 {
        1.0 - self.inputs.sensitivity
    }

    /// ROC area of the equal-variance binormal model through this operating point.
    ///
    /// d' = Φ⁻¹(sensitivity) + Φ⁻¹(specificity), AUC = Φ(d' / √2)
    /// NaN when either probability is NaN.
    pub fn binormal_auc(&self) -> f64 {
        let (sensitivity, specificity) = (self.inputs.sensitivity, self.inputs.specificity);
        if sensitivity.is_nan() || specificity.is_nan() {
            return f64::NAN;
        }

        let Ok(normal) = Normal::new(0.0, 1.0) else {
            return f64::NAN;
        };

        let clamp = |p: f64| p.clamp(PROBIT_EPSILON, 1.0 - PROBIT_EPSILON);
        let d_prime =
            normal.inverse_cdf(clamp(sensitivity)) + normal.inverse_cdf(clamp(specificity));

        normal.cdf(d_prime / std::f64::consts::SQRT_2)
    }

    /// Compute every metric in one pass.
    pub fn metrics(&self) -> DiagnosticMetrics {
        let metrics = DiagnosticMetrics {
            matrix: self.confusion_matrix(),
            sensitivity: self.inputs.sensitivity,
            specificity: self.inputs.specificity,
            accuracy: self.accuracy(),
            ppv: self.ppv(),
            npv: self.npv(),
            f1: self.f1(),
            mcc: self.mcc(),
            balanced_accuracy: self.balanced_accuracy(),
            fdr: self.fdr(),
            auc_approx: self.auc_approx(),
            binormal_auc: self.binormal_auc(),
            false_positive_rate: self.false_positive_rate(),
            false_negative_rate: self.false_negative_rate(),
        };

        tracing::debug!(
            population = self.inputs.population_size,
            accuracy = metrics.accuracy,
            ppv = metrics.ppv,
            npv = metrics.npv,
            mcc = metrics.mcc,
            "computed diagnostic metrics"
        );

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn grid() -> Vec<f64> {
        (0..=10).map(|i| i as f64 / 10.0).collect()
    }

    #[test]
    fn test_screening_scenario() {
        let calc = ConfusionMatrixCalculator::new(0.9, 0.9, 0.1, 1000);

        assert_relative_eq!(calc.true_positives(), 90.0, epsilon = 1e-9);
        assert_relative_eq!(calc.false_positives(), 90.0, epsilon = 1e-9);
        assert_relative_eq!(calc.true_negatives(), 810.0, epsilon = 1e-9);
        assert_relative_eq!(calc.false_negatives(), 10.0, epsilon = 1e-9);

        assert_relative_eq!(calc.accuracy(), 0.90, epsilon = 1e-9);
        assert_relative_eq!(calc.ppv(), 0.50, epsilon = 1e-9);
        assert_relative_eq!(calc.npv(), 810.0 / 820.0, epsilon = 1e-9);
        assert_abs_diff_eq!(calc.npv(), 0.9878, epsilon = 1e-4);
        assert_relative_eq!(calc.fdr(), 0.50, epsilon = 1e-9);
    }

    #[test]
    fn test_perfect_test() {
        let calc = ConfusionMatrixCalculator::new(1.0, 1.0, 0.5, 100);

        assert_eq!(calc.false_positives(), 0.0);
        assert_eq!(calc.false_negatives(), 0.0);
        assert_relative_eq!(calc.ppv(), 1.0);
        assert_relative_eq!(calc.npv(), 1.0);
        assert_relative_eq!(calc.mcc(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(calc.f1(), 1.0, epsilon = 1e-12);
        assert_eq!(calc.fdr(), 0.0);
    }

    #[test]
    fn test_zero_prevalence() {
        let calc = ConfusionMatrixCalculator::new(0.8, 0.9, 0.0, 100);

        assert_eq!(calc.true_positives(), 0.0);
        assert_eq!(calc.false_negatives(), 0.0);
        // Some false positives remain, so PPV is a defined 0
        assert_eq!(calc.ppv(), 0.0);
        assert!(calc.npv().is_finite());

        // With no false positives either, PPV is 0/0
        let calc = ConfusionMatrixCalculator::new(0.8, 1.0, 0.0, 100);
        assert!(calc.ppv().is_nan());
        assert_eq!(calc.f1(), 0.0);
        assert_eq!(calc.fdr(), 0.0);
        assert_eq!(calc.mcc(), 0.0);
    }

    #[test]
    fn test_empty_population() {
        let calc = ConfusionMatrixCalculator::new(0.9, 0.9, 0.1, 0);

        assert!(calc.accuracy().is_nan());
        assert!(calc.ppv().is_nan());
        assert!(calc.npv().is_nan());
        assert_eq!(calc.f1(), 0.0);
        assert_eq!(calc.mcc(), 0.0);
        assert_eq!(calc.fdr(), 0.0);
        assert_eq!(calc.confusion_matrix().total(), 0.0);
    }

    #[test]
    fn test_guarded_metrics_return_zero() {
        // Nobody tests positive: TP + FP = 0
        let calc = ConfusionMatrixCalculator::new(0.0, 1.0, 0.3, 200);
        assert_eq!(calc.fdr(), 0.0);
        assert_eq!(calc.mcc(), 0.0);
        assert_eq!(calc.f1(), 0.0);

        // Everyone has the condition: TN + FP = 0
        let calc = ConfusionMatrixCalculator::new(0.7, 0.4, 1.0, 200);
        assert_eq!(calc.mcc(), 0.0);
    }

    #[test]
    fn test_worst_case_mcc() {
        let calc = ConfusionMatrixCalculator::new(0.0, 0.0, 0.5, 100);
        assert_relative_eq!(calc.mcc(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cells_sum_to_population() {
        for &sens in &grid() {
            for &spec in &grid() {
                for &prev in &grid() {
                    for &n in &[1_u64, 7, 1000, 123_457] {
                        let calc = ConfusionMatrixCalculator::new(sens, spec, prev, n);
                        assert_relative_eq!(
                            calc.confusion_matrix().total(),
                            n as f64,
                            max_relative = 1e-12
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_auc_approx_equals_balanced_accuracy() {
        for &sens in &grid() {
            for &spec in &grid() {
                let calc = ConfusionMatrixCalculator::new(sens, spec, 0.25, 400);
                assert_eq!(calc.auc_approx(), calc.balanced_accuracy());
            }
        }
    }

    #[test]
    fn test_error_rates() {
        let calc = ConfusionMatrixCalculator::new(0.85, 0.95, 0.2, 500);

        assert_relative_eq!(calc.false_negative_rate(), 0.15, epsilon = 1e-12);
        assert_relative_eq!(calc.false_positive_rate(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_binormal_auc() {
        let chance = ConfusionMatrixCalculator::new(0.5, 0.5, 0.1, 1000);
        assert_abs_diff_eq!(chance.binormal_auc(), 0.5, epsilon = 1e-9);

        let chance_line = ConfusionMatrixCalculator::new(0.3, 0.7, 0.1, 1000);
        assert_abs_diff_eq!(chance_line.binormal_auc(), 0.5, epsilon = 1e-6);

        let good = ConfusionMatrixCalculator::new(0.9, 0.9, 0.1, 1000);
        assert_abs_diff_eq!(good.binormal_auc(), 0.965, epsilon = 1e-3);

        let perfect = ConfusionMatrixCalculator::new(1.0, 1.0, 0.1, 1000);
        assert!(perfect.binormal_auc().is_finite());
        assert!(perfect.binormal_auc() > 0.999);
    }

    #[test]
    fn test_nan_input_propagates_without_panic() {
        let metrics = ConfusionMatrixCalculator::new(f64::NAN, 0.9, 0.1, 100).metrics();

        assert!(metrics.binormal_auc.is_nan());
        assert!(metrics.matrix.true_positives.is_nan());
        assert!(metrics.ppv.is_nan());
        assert!(metrics.balanced_accuracy.is_nan());

        let calc = ConfusionMatrixCalculator::new(0.9, f64::NAN, 0.1, 100);
        assert!(calc.binormal_auc().is_nan());
    }

    #[test]
    fn test_empty_population_snapshot_survives_json() {
        let metrics = ConfusionMatrixCalculator::new(0.9, 0.9, 0.1, 0).metrics();
        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("\"accuracy\":null"));

        let restored: DiagnosticMetrics = serde_json::from_str(&json).unwrap();
        assert!(restored.accuracy.is_nan());
        assert!(restored.ppv.is_nan());
        assert!(restored.npv.is_nan());
        assert_eq!(restored.matrix, metrics.matrix);
        assert_eq!(restored.f1, 0.0);
        assert_eq!(restored.mcc, 0.0);
        assert_eq!(restored.fdr, 0.0);
        assert_eq!(restored.binormal_auc, metrics.binormal_auc);
        assert_eq!(restored.sensitivity, 0.9);
    }

    #[test]
    fn test_nan_inputs_survive_json() {
        let inputs = DiagnosticInputs::new(f64::NAN, 0.8, 0.2, 10);
        let json = serde_json::to_string(&inputs).unwrap();

        let restored: DiagnosticInputs = serde_json::from_str(&json).unwrap();
        assert!(restored.sensitivity.is_nan());
        assert_eq!(restored.specificity, 0.8);
        assert_eq!(restored.population_size, 10);
    }

    #[test]
    fn test_metrics_snapshot_matches_operations() {
        let calc = ConfusionMatrixCalculator::from(DiagnosticInputs::default());
        let metrics = calc.metrics();

        assert_eq!(metrics.matrix, calc.confusion_matrix());
        assert_eq!(metrics.ppv, calc.ppv());
        assert_eq!(metrics.mcc, calc.mcc());
        assert_eq!(metrics.auc_approx, metrics.balanced_accuracy);
        assert_eq!(metrics.sensitivity, 0.9);
    }
}

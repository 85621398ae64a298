//! Presentation-neutral report
//!
//! Collects the values, labels and explanatory notes a front end shows next
//! to its controls, without rendering anything itself.

use std::fmt;

use serde::Serialize;

use crate::calculator::{ConfusionMatrixCalculator, DiagnosticMetrics};
use crate::inputs::DiagnosticInputs;
use crate::matrix::MatrixCell;

/// Metrics that get an explanatory entry in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Npv,
    Ppv,
    Sensitivity,
    Specificity,
    FalsePositiveRate,
    FalseNegativeRate,
    F1Score,
    Mcc,
    BalancedAccuracy,
    Fdr,
    AucApprox,
}

impl MetricKind {
    /// Display order of the detail entries
    pub const ALL: [MetricKind; 11] = [
        MetricKind::Npv,
        MetricKind::Ppv,
        MetricKind::Sensitivity,
        MetricKind::Specificity,
        MetricKind::FalsePositiveRate,
        MetricKind::FalseNegativeRate,
        MetricKind::F1Score,
        MetricKind::Mcc,
        MetricKind::BalancedAccuracy,
        MetricKind::Fdr,
        MetricKind::AucApprox,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::Npv => "NPV (Negative Predictive Value)",
            MetricKind::Ppv => "PPV (Positive Predictive Value)",
            MetricKind::Sensitivity => "True Positive Rate (Sensitivity)",
            MetricKind::Specificity => "True Negative Rate (Specificity)",
            MetricKind::FalsePositiveRate => "False Positive Rate",
            MetricKind::FalseNegativeRate => "False Negative Rate",
            MetricKind::F1Score => "F1 Score",
            MetricKind::Mcc => "Matthews Correlation Coefficient (MCC)",
            MetricKind::BalancedAccuracy => "Balanced Accuracy",
            MetricKind::Fdr => "False Discovery Rate (FDR)",
            MetricKind::AucApprox => "AUC (Approximation)",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            MetricKind::Npv => {
                "NPV is the probability that a subject who tests negative actually does not have the disease.\n\
                 It is calculated as:\n\
                 NPV = (True Negatives) / (True Negatives + False Negatives)\n\
                 A high NPV indicates that a negative result from the test is a good indication that the person is disease-free."
            }
            MetricKind::Ppv => {
                "PPV is the probability that a subject who tests positive actually has the disease.\n\
                 It is calculated as:\n\
                 PPV = (True Positives) / (True Positives + False Positives)\n\
                 A high PPV means that a positive result from the test is a reliable indicator of disease presence."
            }
            MetricKind::Sensitivity => {
                "Sensitivity, or True Positive Rate, measures the test's ability to correctly identify those with the disease.\n\
                 It is calculated as:\n\
                 Sensitivity = (True Positives) / (True Positives + False Negatives)\n\
                 A high sensitivity means the test is good at detecting the disease in those who have it."
            }
            MetricKind::Specificity => {
                "Specificity, or True Negative Rate, measures the test's ability to correctly identify those without the disease.\n\
                 It is calculated as:\n\
                 Specificity = (True Negatives) / (True Negatives + False Positives)\n\
                 A high specificity indicates that the test effectively identifies individuals who do not have the disease."
            }
            MetricKind::FalsePositiveRate => {
                "False Positive Rate is the proportion of subjects without the disease who incorrectly test positive.\n\
                 It is calculated as:\n\
                 False Positive Rate = 1 - Specificity\n\
                 A lower false positive rate means fewer healthy individuals are mistakenly identified as having the disease."
            }
            MetricKind::FalseNegativeRate => {
                "False Negative Rate is the proportion of subjects with the disease who incorrectly test negative.\n\
                 It is calculated as:\n\
                 False Negative Rate = 1 - Sensitivity\n\
                 A lower false negative rate indicates fewer individuals with the disease are missed by the test."
            }
            MetricKind::F1Score => {
                "The F1 Score is the harmonic mean of Precision (PPV) and Recall (Sensitivity).\n\
                 It balances the trade-off between Precision and Recall.\n\
                 It is calculated as:\n\
                 F1 Score = 2 * (Precision * Recall) / (Precision + Recall)\n\
                 A higher F1 Score indicates a better balance between Precision and Recall."
            }
            MetricKind::Mcc => {
                "The MCC is a measure of the quality of binary classifications. It considers all four confusion matrix categories (TP, FP, TN, FN).\n\
                 It is calculated as:\n\
                 MCC = (TP * TN - FP * FN) / sqrt((TP + FP) * (TP + FN) * (TN + FP) * (TN + FN))\n\
                 MCC ranges from -1 (total disagreement) to 1 (perfect prediction), with 0 indicating no better than random prediction."
            }
            MetricKind::BalancedAccuracy => {
                "Balanced Accuracy is the average of Sensitivity and Specificity.\n\
                 It is calculated as:\n\
                 Balanced Accuracy = (Sensitivity + Specificity) / 2\n\
                 This metric provides a balanced view of performance, especially in imbalanced datasets."
            }
            MetricKind::Fdr => {
                "FDR is the proportion of false positives among the positive test results.\n\
                 It is calculated as:\n\
                 FDR = (False Positives) / (True Positives + False Positives)\n\
                 A lower FDR indicates fewer false positives among the declared positives."
            }
            MetricKind::AucApprox => {
                "AUC represents the area under the ROC curve, approximating the test's performance across different thresholds.\n\
                 It is a measure of the test's ability to discriminate between positive and negative cases.\n\
                 While this implementation is a simplified approximation, a higher AUC indicates better overall test performance."
            }
        }
    }

    pub fn value(&self, metrics: &DiagnosticMetrics) -> f64 {
        match self {
            MetricKind::Npv => metrics.npv,
            MetricKind::Ppv => metrics.ppv,
            MetricKind::Sensitivity => metrics.sensitivity,
            MetricKind::Specificity => metrics.specificity,
            MetricKind::FalsePositiveRate => metrics.false_positive_rate,
            MetricKind::FalseNegativeRate => metrics.false_negative_rate,
            MetricKind::F1Score => metrics.f1,
            MetricKind::Mcc => metrics.mcc,
            MetricKind::BalancedAccuracy => metrics.balanced_accuracy,
            MetricKind::Fdr => metrics.fdr,
            MetricKind::AucApprox => metrics.auc_approx,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDetail {
    pub kind: MetricKind,
    pub title: &'static str,
    /// Serialized as `null` when NaN
    pub value: f64,
    pub explanation: &'static str,
}

impl MetricDetail {
    fn new(kind: MetricKind, metrics: &DiagnosticMetrics) -> Self {
        Self {
            kind,
            title: kind.title(),
            value: kind.value(metrics),
            explanation: kind.explanation(),
        }
    }

    /// Two-decimal rendering; NaN and infinities print as `NaN`/`inf`.
    pub fn formatted_value(&self) -> String {
        format_value(self.value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartBar {
    pub label: &'static str,
    pub count: f64,
}

/// Everything a front end needs to display one simulation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub inputs: DiagnosticInputs,
    pub metrics: DiagnosticMetrics,
    pub chart: Vec<ChartBar>,
    pub details: Vec<MetricDetail>,
}

impl DiagnosticReport {
    pub fn from_calculator(calculator: &ConfusionMatrixCalculator) -> Self {
        let metrics = calculator.metrics();

        let chart = metrics
            .matrix
            .cells()
            .into_iter()
            .map(|(cell, count)| ChartBar {
                label: cell.label(),
                count,
            })
            .collect();

        let details = MetricKind::ALL
            .iter()
            .map(|&kind| MetricDetail::new(kind, &metrics))
            .collect();

        Self {
            inputs: *calculator.inputs(),
            metrics,
            chart,
            details,
        }
    }

    pub fn accuracy(&self) -> f64 {
        self.metrics.accuracy
    }

    pub fn detail(&self, kind: MetricKind) -> Option<&MetricDetail> {
        self.details.iter().find(|d| d.kind == kind)
    }
}

impl From<DiagnosticInputs> for DiagnosticReport {
    fn from(inputs: DiagnosticInputs) -> Self {
        Self::from_calculator(&ConfusionMatrixCalculator::from(inputs))
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Testing Simulation")?;
        writeln!(
            f,
            "Sensitivity: {:.2}  Specificity: {:.2}  Prevalence: {:.2}",
            self.inputs.sensitivity, self.inputs.specificity, self.inputs.prevalence
        )?;
        writeln!(
            f,
            "Population Size: {}  Accuracy: {}",
            self.inputs.population_size,
            format_value(self.accuracy())
        )?;
        writeln!(f)?;

        for cell in MatrixCell::ALL {
            writeln!(
                f,
                "{:<16} {:>12.2}",
                cell.label(),
                self.metrics.matrix.count(cell)
            )?;
        }
        writeln!(f)?;

        for detail in &self.details {
            writeln!(f, "{}: {}", detail.title, detail.formatted_value())?;
            for line in detail.explanation.lines() {
                writeln!(f, "    {line}")?;
            }
        }

        Ok(())
    }
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.2}")
    }
}

use serde::{Deserialize, Serialize};

use crate::nan::null_as_nan;

/// One cell of the 2x2 confusion matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixCell {
    TruePositive,
    FalsePositive,
    TrueNegative,
    FalseNegative,
}

impl MatrixCell {
    /// Chart order: TP, FP, TN, FN
    pub const ALL: [MatrixCell; 4] = [
        MatrixCell::TruePositive,
        MatrixCell::FalsePositive,
        MatrixCell::TrueNegative,
        MatrixCell::FalseNegative,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MatrixCell::TruePositive => "True Positives",
            MatrixCell::FalsePositive => "False Positives",
            MatrixCell::TrueNegative => "True Negatives",
            MatrixCell::FalseNegative => "False Negatives",
        }
    }
}

impl std::fmt::Display for MatrixCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Expected cell counts for a population. Counts are fractional: they are
/// expectations, not tallies of observed subjects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionMatrix {
    #[serde(deserialize_with = "null_as_nan")]
    pub true_positives: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub false_positives: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub true_negatives: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub false_negatives: f64,
}

impl ConfusionMatrix {
    pub fn count(&self, cell: MatrixCell) -> f64 {
        match cell {
            MatrixCell::TruePositive => self.true_positives,
            MatrixCell::FalsePositive => self.false_positives,
            MatrixCell::TrueNegative => self.true_negatives,
            MatrixCell::FalseNegative => self.false_negatives,
        }
    }

    /// Sum of all four cells; equals the population size up to rounding.
    pub fn total(&self) -> f64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Subjects that tested positive (TP + FP)
    pub fn predicted_positive(&self) -> f64 {
        self.true_positives + self.false_positives
    }

    /// Subjects that tested negative (TN + FN)
    pub fn predicted_negative(&self) -> f64 {
        self.true_negatives + self.false_negatives
    }

    /// Labeled counts in chart order, ready for a bar chart.
    pub fn cells(&self) -> Vec<(MatrixCell, f64)> {
        MatrixCell::ALL
            .iter()
            .map(|&cell| (cell, self.count(cell)))
            .collect()
    }
}

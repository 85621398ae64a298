//! Diagnostic Test Statistics
//!
//! Computes expected confusion-matrix counts and the derived performance
//! metrics of a diagnostic test (PPV, NPV, F1, MCC, balanced accuracy, FDR,
//! AUC) from sensitivity, specificity, prevalence and population size.
//!
//! ```
//! use diagnostic_stats::ConfusionMatrixCalculator;
//!
//! let calc = ConfusionMatrixCalculator::new(0.9, 0.9, 0.1, 1000);
//! assert!((calc.ppv() - 0.5).abs() < 1e-9);
//! ```

pub mod calculator;
pub mod error;
pub mod inputs;
pub mod matrix;
mod nan;
pub mod report;

pub use calculator::{ConfusionMatrixCalculator, DiagnosticMetrics};
pub use error::{DiagnosticError, Result};
pub use inputs::{snap_to_step, DiagnosticInputs, PROBABILITY_RANGE, PROBABILITY_STEP};
pub use matrix::{ConfusionMatrix, MatrixCell};
pub use report::{ChartBar, DiagnosticReport, MetricDetail, MetricKind};

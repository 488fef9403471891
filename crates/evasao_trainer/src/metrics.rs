//! Held-out evaluation metrics
//!
//! Accuracy, the 2x2 confusion matrix and a per-class precision / recall /
//! F1 report with macro and support-weighted averages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Rows are true classes, columns predicted classes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut matrix = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t, p) {
                (1, 1) => matrix.true_positives += 1,
                (1, _) => matrix.false_negatives += 1,
                (_, 1) => matrix.false_positives += 1,
                _ => matrix.true_negatives += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_negatives + self.true_positives, self.total())
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[[{} {}]", self.true_negatives, self.false_positives)?;
        write!(f, " [{} {}]]", self.false_negatives, self.true_positives)
    }
}

/// Precision, recall, F1 and support for one class
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn new(tp: usize, fp: usize, fn_: usize) -> Self {
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support: tp + fn_,
        }
    }
}

/// Full evaluation of a binary classifier on held-out data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    /// Class 0 (no dropout)
    pub negative: ClassMetrics,
    /// Class 1 (dropout)
    pub positive: ClassMetrics,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ClassificationReport {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let confusion = ConfusionMatrix::from_predictions(y_true, y_pred);
        let c = &confusion;

        let negative = ClassMetrics::new(c.true_negatives, c.false_negatives, c.false_positives);
        let positive = ClassMetrics::new(c.true_positives, c.false_positives, c.false_negatives);
        let total = c.total();

        let macro_avg = ClassMetrics {
            precision: (negative.precision + positive.precision) / 2.0,
            recall: (negative.recall + positive.recall) / 2.0,
            f1: (negative.f1 + positive.f1) / 2.0,
            support: total,
        };

        let weight = |m: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                (m(&negative) * negative.support as f64 + m(&positive) * positive.support as f64)
                    / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1: weight(|m| m.f1),
            support: total,
        };

        Self {
            confusion,
            accuracy: confusion.accuracy(),
            negative,
            positive,
            macro_avg,
            weighted_avg,
        }
    }

    /// Flat metric map stored in the model metadata
    pub fn to_metric_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert("accuracy".to_string(), self.accuracy);
        map.insert("precision_evasao".to_string(), self.positive.precision);
        map.insert("recall_evasao".to_string(), self.positive.recall);
        map.insert("f1_evasao".to_string(), self.positive.f1);
        map.insert("f1_macro".to_string(), self.macro_avg.f1);
        map.insert("f1_weighted".to_string(), self.weighted_avg.f1);
        map
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, m) in [("0", &self.negative), ("1", &self.positive)] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.confusion.total()
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

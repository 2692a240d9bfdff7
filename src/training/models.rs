//! Evaluation metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metrics for a held-out evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
    /// Area under the ROC curve; `None` when only one class is present
    pub auc_roc: Option<f64>,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl ModelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute classification metrics. Precision, recall and F1 are 0.0 when
    /// their denominator is zero.
    pub fn compute_classification(
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        y_prob: Option<&Array1<f64>>,
    ) -> Self {
        let mut metrics = Self::new();
        metrics.n_samples = y_true.len();
        if y_true.is_empty() {
            return metrics;
        }

        let (tp, fp, tn, fn_) = Self::confusion_counts(y_true, y_pred);

        metrics.accuracy = Some((tp + tn) as f64 / y_true.len() as f64);
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        metrics.precision = Some(precision);
        metrics.recall = Some(recall);
        metrics.f1_score = Some(if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        });
        metrics.auc_roc = y_prob.and_then(|p| roc_auc(y_true, p));

        metrics
    }

    /// `(name, value)` for every metric that was computed, in report order
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        [
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1", self.f1_score),
            ("roc_auc", self.auc_roc),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    fn confusion_counts(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> (usize, usize, usize, usize) {
        let mut tp = 0;
        let mut fp = 0;
        let mut tn = 0;
        let mut fn_ = 0;

        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (false, false) => tn += 1,
                (true, false) => fn_ += 1,
            }
        }

        (tp, fp, tn, fn_)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

/// ROC-AUC via the Mann-Whitney rank statistic, averaging ranks over ties
pub fn roc_auc(y_true: &Array1<f64>, scores: &Array1<f64>) -> Option<f64> {
    let n_pos = y_true.iter().filter(|&&t| t > 0.5).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 || scores.len() != y_true.len() {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1..=j+1 share their average
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(&ranks)
        .filter(|(&t, _)| t > 0.5)
        .map(|(_, &r)| r)
        .sum();
    let u = pos_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Some(u / (n_pos * n_neg) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classification_metrics() {
        let y_true = array![1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        let y_pred = array![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];

        let metrics = ModelMetrics::compute_classification(&y_true, &y_pred, None);

        // tp 3, fp 1, tn 3, fn 1
        assert_eq!(metrics.accuracy, Some(0.75));
        assert_eq!(metrics.precision, Some(0.75));
        assert_eq!(metrics.recall, Some(0.75));
        assert!((metrics.f1_score.unwrap() - 0.75).abs() < 1e-12);
        assert_eq!(metrics.auc_roc, None);
        assert_eq!(metrics.n_samples, 8);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let y_true = array![1.0, 1.0, 0.0];
        let y_pred = array![0.0, 0.0, 0.0];

        let metrics = ModelMetrics::compute_classification(&y_true, &y_pred, None);
        assert_eq!(metrics.precision, Some(0.0));
        assert_eq!(metrics.recall, Some(0.0));
        assert_eq!(metrics.f1_score, Some(0.0));
    }

    #[test]
    fn test_roc_auc() {
        let y_true = array![0.0, 0.0, 1.0, 1.0];
        assert_eq!(roc_auc(&y_true, &array![0.1, 0.4, 0.35, 0.8]), Some(0.75));
        assert_eq!(roc_auc(&y_true, &array![0.1, 0.2, 0.3, 0.4]), Some(1.0));
        // Every score tied
        assert_eq!(roc_auc(&y_true, &array![0.5, 0.5, 0.5, 0.5]), Some(0.5));
    }

    #[test]
    fn test_roc_auc_single_class() {
        assert_eq!(roc_auc(&array![1.0, 1.0], &array![0.2, 0.9]), None);
    }

    #[test]
    fn test_named_metrics() {
        let y_true = array![0.0, 1.0];
        let y_pred = array![0.0, 1.0];
        let y_prob = array![0.2, 0.9];
        let metrics = ModelMetrics::compute_classification(&y_true, &y_pred, Some(&y_prob));

        let names: Vec<&str> = metrics.named().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["accuracy", "precision", "recall", "f1", "roc_auc"]);
        assert_eq!(metrics.auc_roc, Some(1.0));
    }
}

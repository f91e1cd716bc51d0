//! Reading the chosen iteration count back from a fitted booster.

use tracing::debug;

use crate::booster::Booster;

/// Estimator count chosen by the last early-stopped fit.
///
/// Uses the booster's best iteration when it reported a positive one. A
/// booster that never early-stopped reports nothing (or zero), in which case
/// its current estimator count stands.
pub fn tuned_n_estimators<B: Booster + ?Sized>(booster: &B) -> usize {
    match booster.best_iteration() {
        Some(best) if best > 0 => best,
        other => {
            debug!(
                best_iteration = ?other,
                "No best iteration reported, keeping n_estimators={}",
                booster.n_estimators()
            );
            booster.n_estimators()
        }
    }
}

/// Whether larger values of `metric` are better.
///
/// Follows LightGBM naming: ranking and area metrics maximise, losses and
/// errors minimise. `@k` suffixes are ignored.
#[must_use]
pub fn metric_higher_is_better(metric: &str) -> bool {
    let base = metric.split('@').next().unwrap_or(metric);
    matches!(
        base.trim().to_ascii_lowercase().as_str(),
        "auc" | "auc_mu" | "average_precision" | "ndcg" | "map" | "mean_average_precision"
    )
}

/// Per-round validation scores of one training run.
///
/// Helper for [`Booster`] implementations that track early stopping
/// themselves.
///
/// # Example
///
/// ```
/// use gbm_autosplit::EvalHistory;
///
/// let mut history = EvalHistory::new(false); // lower is better
/// for loss in [0.9, 0.7, 0.6, 0.65, 0.66] {
///     history.push(loss);
/// }
/// assert_eq!(history.best_iteration(), Some(3));
/// assert!(history.should_stop(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EvalHistory {
    scores: Vec<f64>,
    higher_is_better: bool,
}

impl EvalHistory {
    #[must_use]
    pub fn new(higher_is_better: bool) -> Self {
        Self {
            scores: Vec::new(),
            higher_is_better,
        }
    }

    /// History for a named metric; see [`metric_higher_is_better`].
    #[must_use]
    pub fn for_metric(metric: &str) -> Self {
        Self::new(metric_higher_is_better(metric))
    }

    /// Record the score of the next round.
    pub fn push(&mut self, score: f64) {
        self.scores.push(score);
    }

    #[must_use]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Number of recorded rounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// 1-based round with the best score; the earliest one on ties.
    /// NaN scores never win.
    #[must_use]
    pub fn best_iteration(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (round, &score) in self.scores.iter().enumerate() {
            if score.is_nan() {
                continue;
            }
            let improves = match best {
                None => true,
                Some((_, current)) if self.higher_is_better => score > current,
                Some((_, current)) => score < current,
            };
            if improves {
                best = Some((round, score));
            }
        }
        best.map(|(round, _)| round + 1)
    }

    /// Best recorded score.
    #[must_use]
    pub fn best_score(&self) -> Option<f64> {
        self.best_iteration().map(|iteration| self.scores[iteration - 1])
    }

    /// Rounds recorded after the best one.
    #[must_use]
    pub fn rounds_since_best(&self) -> usize {
        self.len() - self.best_iteration().unwrap_or(0)
    }

    /// `true` once `patience` rounds passed without improvement.
    /// A patience of zero never stops.
    #[must_use]
    pub fn should_stop(&self, patience: u32) -> bool {
        patience > 0 && self.rounds_since_best() >= patience as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBooster;

    #[test]
    fn test_tuned_n_estimators_prefers_best_iteration() {
        let mut booster = RecordingBooster::default();
        booster.set_n_estimators(500);

        booster.best_iteration = Some(123);
        assert_eq!(tuned_n_estimators(&booster), 123);

        booster.best_iteration = Some(0);
        assert_eq!(tuned_n_estimators(&booster), 500);

        booster.best_iteration = None;
        assert_eq!(tuned_n_estimators(&booster), 500);
    }

    #[test]
    fn test_metric_direction() {
        assert!(metric_higher_is_better("auc"));
        assert!(metric_higher_is_better("ndcg@5"));
        assert!(metric_higher_is_better("MAP@10"));
        assert!(!metric_higher_is_better("rmse"));
        assert!(!metric_higher_is_better("binary_logloss"));
        assert!(!metric_higher_is_better("l1"));
        assert!(metric_higher_is_better("auc_mu"));
        assert!(!metric_higher_is_better("lambdarank"));
    }

    #[test]
    fn test_best_iteration_lower_is_better() {
        let mut history = EvalHistory::for_metric("rmse");
        assert_eq!(history.best_iteration(), None);
        assert_eq!(history.rounds_since_best(), 0);

        for score in [1.0, 0.8, 0.5, 0.5, 0.7] {
            history.push(score);
        }
        assert_eq!(history.best_iteration(), Some(3));
        assert_eq!(history.best_score(), Some(0.5));
        assert_eq!(history.rounds_since_best(), 2);
        assert!(history.should_stop(2));
        assert!(!history.should_stop(3));
        assert!(!history.should_stop(0));
    }

    #[test]
    fn test_best_iteration_higher_is_better() {
        let mut history = EvalHistory::for_metric("auc");
        for score in [0.6, f64::NAN, 0.75, 0.74] {
            history.push(score);
        }
        assert_eq!(history.best_iteration(), Some(3));
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn test_all_nan_history_has_no_best() {
        let mut history = EvalHistory::new(false);
        history.push(f64::NAN);
        assert_eq!(history.best_iteration(), None);
        assert_eq!(history.rounds_since_best(), 1);
    }
}

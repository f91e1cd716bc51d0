//! Auto-split fit orchestration.
//!
//! Two phases behind one gate:
//!
//! 1. **Gate**: no positive patience on the booster means nothing to tune.
//! 2. **Tuning**: fit on a random training subset with the remainder as the
//!    eval set and early stopping on, then pin the estimator count to the best
//!    iteration.
//! 3. **Final**: turn early stopping off so the full-data fit (and any refit)
//!    trains exactly the pinned number of estimators.
//!
//! The full-data fit itself belongs to [`AutoSplitLearner::fit`].

use ndarray::{ArrayView1, ArrayView2};
use tracing::{debug, info, warn};

use crate::booster::{Booster, EvalSet, FitOptions, FitRequest};
use crate::error::Result;
use crate::history::tuned_n_estimators;
use crate::learner::AutoSplitLearner;
use crate::split::{Splitter, split_xy};

/// Pick the learner's estimator count on a validation split, then disable
/// early stopping.
///
/// Does not run the full-data fit.
///
/// # Errors
///
/// - [`AutoSplitError::ShapeMismatch`](crate::AutoSplitError::ShapeMismatch)
///   if `x` and `y` disagree on row count
/// - [`AutoSplitError::Booster`](crate::AutoSplitError::Booster) if the
///   tuning fit fails
pub fn auto_split_fit<B: Booster, S: Splitter>(
    learner: &mut AutoSplitLearner<B, S>,
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    options: &FitOptions,
) -> Result<()> {
    if learner.tuning_enabled() {
        let max_n_estimators = learner.config().max_n_estimators;
        let tuned = tune_n_estimators(learner, x, y, options)?;

        if tuned == max_n_estimators {
            warn!(
                "n_estimators reached max_n_estimators={}, consider raising it",
                max_n_estimators
            );
        }
    } else {
        debug!("Early stopping disabled, keeping n_estimators={}", learner.n_estimators());
    }

    learner.booster_mut().set_early_stopping_rounds(None);
    Ok(())
}

/// The tuning phase: one early-stopped fit on a random split.
///
/// Returns the estimator count now set on the booster.
fn tune_n_estimators<B: Booster, S: Splitter>(
    learner: &mut AutoSplitLearner<B, S>,
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    options: &FitOptions,
) -> Result<usize> {
    let ratio = learner.config().ratio_training;
    let split = split_xy(learner.splitter_mut(), x, y, ratio)?;

    let (train_weights, val_weights) = match &options.sample_weight {
        Some(weights) => (
            Some(split.partition.select_training(weights.view())),
            Some(split.partition.select_validation(weights.view())),
        ),
        None => (None, None),
    };

    let metric = learner.config().eval_metric.clone();
    let patience = learner.early_stopping_rounds();

    debug!(
        training_rows = split.x_train.nrows(),
        validation_rows = split.x_val.nrows(),
        metric = %metric,
        patience = ?patience,
        "Tuning n_estimators on validation split"
    );

    let mut eval_set = EvalSet::new(split.x_val.view(), split.y_val.view());
    eval_set.sample_weight = val_weights.as_ref().map(|w| w.view());

    let request = FitRequest::new(split.x_train.view(), split.y_train.view())
        .with_options(options, train_weights.as_ref().map(|w| w.view()))
        .with_eval_set(eval_set)
        .with_eval_metric(&metric)
        .with_early_stopping_rounds(patience)
        .with_verbose(false);
    learner.call_booster_fit(request)?;

    let tuned = tuned_n_estimators(learner.booster());
    learner.booster_mut().set_n_estimators(tuned);
    info!(
        best_iteration = ?learner.booster().best_iteration(),
        "Tuned n_estimators={}",
        tuned
    );

    Ok(tuned)
}

//! The learner: a booster with auto-split tuning layered on top.

use ndarray::{Array1, ArrayView1, ArrayView2};
use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::autosplit::auto_split_fit;
use crate::booster::{Booster, DiagnosticKind, DiagnosticSink, FitOptions, FitRequest};
use crate::config::{AutoSplitConfig, Task};
use crate::error::{AutoSplitError, Result, ensure_rows};
use crate::frame;
use crate::params::{BoosterParams, MIN_CHILD_SAMPLES};
use crate::split::{RandomSplitter, Splitter, training_size};

/// `ceil(ratio * sample_size)`, the minimum samples per leaf for a fit on
/// `sample_size` rows.
#[must_use]
pub fn min_child_samples_for(ratio: f64, sample_size: usize) -> usize {
    (ratio * sample_size as f64).ceil() as usize
}

/// A booster whose estimator count is picked by an early-stopped fit on a
/// random split, then refit on all rows.
///
/// # Example
///
/// ```ignore
/// use gbm_autosplit::{AutoSplitConfig, AutoSplitLearner, FitOptions};
///
/// let config = AutoSplitConfig::builder()
///     .max_n_estimators(500)
///     .early_stopping_rounds(50)
///     .build()?;
/// let mut learner = AutoSplitLearner::new(booster, config)?;
/// learner.fit(x.view(), y.view(), &FitOptions::new())?;
/// println!("trees: {}", learner.n_estimators());
/// ```
#[derive(Debug)]
pub struct AutoSplitLearner<B, S = RandomSplitter> {
    booster: B,
    splitter: S,
    config: AutoSplitConfig,
    feature_names: Option<Vec<String>>,
    fitted: bool,
}

impl<B: Booster> AutoSplitLearner<B> {
    /// Wrap `booster` with an entropy-seeded splitter.
    ///
    /// # Errors
    ///
    /// Returns [`AutoSplitError::InvalidConfig`] if `config` does not validate.
    pub fn new(booster: B, config: AutoSplitConfig) -> Result<Self> {
        Self::with_parts(booster, RandomSplitter::from_entropy(), config)
    }

    /// Classification defaults (metric `auc`).
    ///
    /// # Errors
    ///
    /// Never fails for the default settings; kept fallible to match [`Self::new`].
    pub fn classifier(booster: B) -> Result<Self> {
        Self::new(booster, AutoSplitConfig::for_task(Task::Classification))
    }

    /// Regression defaults (metric `rmse`).
    ///
    /// # Errors
    ///
    /// Never fails for the default settings; kept fallible to match [`Self::new`].
    pub fn regressor(booster: B) -> Result<Self> {
        Self::new(booster, AutoSplitConfig::for_task(Task::Regression))
    }
}

impl<B: Booster, S: Splitter> AutoSplitLearner<B, S> {
    /// Build a learner from its three parts.
    ///
    /// The booster starts at `max_n_estimators` with the configured patience.
    ///
    /// # Errors
    ///
    /// Returns [`AutoSplitError::InvalidConfig`] if `config` does not validate.
    pub fn with_parts(mut booster: B, splitter: S, config: AutoSplitConfig) -> Result<Self> {
        config.validate()?;
        booster.set_n_estimators(config.max_n_estimators);
        booster.set_early_stopping_rounds(config.early_stopping_rounds);
        debug!(
            task = config.task.as_str(),
            max_n_estimators = config.max_n_estimators,
            early_stopping_rounds = ?config.early_stopping_rounds,
            "Created auto-split learner"
        );
        Ok(Self {
            booster,
            splitter,
            config,
            feature_names: None,
            fitted: false,
        })
    }

    /// Swap the random source used for the tuning split.
    #[must_use]
    pub fn with_splitter<T: Splitter>(self, splitter: T) -> AutoSplitLearner<B, T> {
        AutoSplitLearner {
            booster: self.booster,
            splitter,
            config: self.config,
            feature_names: self.feature_names,
            fitted: self.fitted,
        }
    }

    /// Merge native hyperparameters into the booster.
    #[must_use]
    pub fn with_params(mut self, params: BoosterParams) -> Self {
        self.booster.params_mut().merge(params);
        self
    }

    pub fn config(&self) -> &AutoSplitConfig {
        &self.config
    }

    pub fn booster(&self) -> &B {
        &self.booster
    }

    pub fn booster_mut(&mut self) -> &mut B {
        &mut self.booster
    }

    pub fn splitter(&self) -> &S {
        &self.splitter
    }

    pub fn splitter_mut(&mut self) -> &mut S {
        &mut self.splitter
    }

    pub fn into_booster(self) -> B {
        self.booster
    }

    pub fn n_estimators(&self) -> usize {
        self.booster.n_estimators()
    }

    pub fn early_stopping_rounds(&self) -> Option<u32> {
        self.booster.early_stopping_rounds()
    }

    /// Whether the next `fit` will run the tuning phase.
    ///
    /// Read from the booster, so it turns off after the first fit.
    pub fn tuning_enabled(&self) -> bool {
        self.booster
            .early_stopping_rounds()
            .is_some_and(|rounds| rounds > 0)
    }

    /// Current `min_child_samples` hyperparameter, if set.
    pub fn min_child_samples(&self) -> Option<usize> {
        self.booster.params().get_usize(MIN_CHILD_SAMPLES)
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Column names remembered by [`Self::fit_frame`].
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Tune the estimator count (when patience is set) and fit on all rows.
    ///
    /// # Errors
    ///
    /// - [`AutoSplitError::ShapeMismatch`] if `x`, `y` or the sample weights
    ///   disagree on row count
    /// - [`AutoSplitError::Booster`] if either delegate call fails
    pub fn fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        options: &FitOptions,
    ) -> Result<()> {
        ensure_rows("fit", x.nrows(), y.len())?;
        if let Some(weights) = &options.sample_weight {
            ensure_rows("fit (sample_weight)", weights.len(), y.len())?;
        }

        let n_samples = x.nrows();
        self.fitted = false;
        self.feature_names = None;

        if self.tuning_enabled() {
            self.apply_min_child_samples(training_size(n_samples, self.config.ratio_training));
        }

        auto_split_fit(self, x, y, options)?;

        self.apply_min_child_samples(n_samples);

        info!(
            n_samples,
            n_estimators = self.booster.n_estimators(),
            "Fitting booster on full data"
        );
        let request = FitRequest::new(x.view(), y.view())
            .with_options(options, options.sample_weight.as_ref().map(|w| w.view()))
            .with_verbose(self.config.verbose);
        self.call_booster_fit(request)?;

        self.fitted = true;
        Ok(())
    }

    /// Run one delegate training call.
    ///
    /// The early-stopping override notice is expected here and is dropped for
    /// the duration of this call only. Other diagnostics are logged.
    ///
    /// # Errors
    ///
    /// Returns [`AutoSplitError::Booster`] wrapping the booster's own error.
    pub fn call_booster_fit(&mut self, request: FitRequest<'_>) -> Result<()> {
        let diagnostics =
            DiagnosticSink::suppressing(DiagnosticKind::EarlyStoppingRoundsOverridden);

        debug!(
            rows = request.x.nrows(),
            eval_sets = request.eval_sets.len(),
            early_stopping_rounds = ?request.early_stopping_rounds,
            n_estimators = self.booster.n_estimators(),
            "Calling booster fit"
        );
        let outcome = self.booster.fit(request, &diagnostics);

        let suppressed = diagnostics.suppressed_count();
        if suppressed > 0 {
            debug!("Suppressed {} expected booster diagnostic(s)", suppressed);
        }

        outcome.map_err(|e| AutoSplitError::booster(e))
    }

    /// Predict with the fitted booster.
    ///
    /// # Errors
    ///
    /// - [`AutoSplitError::NotFitted`] before the first successful `fit`
    /// - [`AutoSplitError::Booster`] if the booster fails
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        if !self.fitted {
            return Err(AutoSplitError::NotFitted);
        }
        self.booster.predict(x).map_err(|e| AutoSplitError::booster(e))
    }

    /// Fit from a DataFrame, using `target` (or the last column) as labels.
    ///
    /// # Errors
    ///
    /// Column lookup and conversion errors from [`frame::split_target`], plus
    /// everything [`Self::fit`] returns.
    pub fn fit_frame(
        &mut self,
        df: &DataFrame,
        target: Option<&str>,
        options: &FitOptions,
    ) -> Result<()> {
        let data = frame::split_target(df, target)?;
        self.fit(data.features.view(), data.target.view(), options)?;
        self.feature_names = Some(data.feature_names);
        Ok(())
    }

    /// Predict on a DataFrame holding the columns seen by [`Self::fit_frame`].
    ///
    /// # Errors
    ///
    /// - [`AutoSplitError::NotFitted`] if the learner was not fitted from a frame
    /// - [`AutoSplitError::ColumnNotFound`] if a training column is missing
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let names = self
            .feature_names
            .as_deref()
            .ok_or(AutoSplitError::NotFitted)?;
        let x = frame::feature_matrix(df, names)?;
        self.predict(x.view())
    }

    /// Set `min_child_samples = ceil(ratio * sample_size)` when a ratio is
    /// configured. For tuning, `sample_size` is the training subset size
    /// `floor(ratio_training * n)`, not the unfloored `ratio_training * n`,
    /// so the result can be one lower than scaling the fraction directly.
    fn apply_min_child_samples(&mut self, sample_size: usize) {
        let Some(ratio) = self.config.ratio_min_child_samples else {
            return;
        };
        let value = min_child_samples_for(ratio, sample_size);
        debug!(sample_size, "Setting {}={}", MIN_CHILD_SAMPLES, value);
        self.booster.params_mut().set(MIN_CHILD_SAMPLES, value);
    }
}

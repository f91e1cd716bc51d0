//! The booster seam.
//!
//! The learner never trains trees itself. It drives an external
//! gradient-boosting model through the [`Booster`] trait: one training call
//! per phase, a settable estimator count and early-stopping patience, and
//! the best iteration read back after an early-stopped fit.
//!
//! Boosters surface non-fatal messages (library warnings) through a
//! [`DiagnosticSink`]. The sink decides, per call, which kinds are expected
//! and therefore silenced.

use std::cell::Cell;

use ndarray::{Array1, ArrayView1, ArrayView2};
use tracing::{debug, warn};

use crate::params::BoosterParams;

/// A gradient-boosted tree model the learner delegates to.
///
/// Implementations own their hyperparameters. The learner only touches the
/// estimator count, the early-stopping patience and, through
/// [`params_mut`](Self::params_mut), the passthrough bundle.
pub trait Booster {
    /// Failure raised by training or prediction.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Train on `request`, reporting library diagnostics to `diagnostics`.
    ///
    /// When `request.eval_sets` is non-empty and
    /// `request.early_stopping_rounds` is positive, the booster must record
    /// the best iteration so that [`best_iteration`](Self::best_iteration)
    /// can report it.
    fn fit(
        &mut self,
        request: FitRequest<'_>,
        diagnostics: &DiagnosticSink,
    ) -> Result<(), Self::Error>;

    /// Predict one value per row of `x`.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, Self::Error>;

    /// Number of boosting iterations the next fit will run at most.
    fn n_estimators(&self) -> usize;

    fn set_n_estimators(&mut self, n_estimators: usize);

    /// Configured early-stopping patience; `None` when disabled.
    fn early_stopping_rounds(&self) -> Option<u32>;

    fn set_early_stopping_rounds(&mut self, rounds: Option<u32>);

    /// Best iteration (1-based) of the last early-stopped fit, if any.
    fn best_iteration(&self) -> Option<usize>;

    /// Native hyperparameters.
    fn params(&self) -> &BoosterParams;

    fn params_mut(&mut self) -> &mut BoosterParams;
}

/// A held-out set evaluated after every boosting round.
#[derive(Debug, Clone)]
pub struct EvalSet<'a> {
    pub x: ArrayView2<'a, f64>,
    pub y: ArrayView1<'a, f64>,
    pub sample_weight: Option<ArrayView1<'a, f64>>,
}

impl<'a> EvalSet<'a> {
    #[must_use]
    pub fn new(x: ArrayView2<'a, f64>, y: ArrayView1<'a, f64>) -> Self {
        Self {
            x,
            y,
            sample_weight: None,
        }
    }
}

/// Everything a single training call receives.
#[derive(Debug, Clone)]
pub struct FitRequest<'a> {
    pub x: ArrayView2<'a, f64>,
    pub y: ArrayView1<'a, f64>,
    pub sample_weight: Option<ArrayView1<'a, f64>>,
    pub eval_sets: Vec<EvalSet<'a>>,
    pub eval_metric: Option<&'a str>,
    pub early_stopping_rounds: Option<u32>,
    pub verbose: bool,
    pub categorical_features: &'a [usize],
    pub extra: Option<&'a BoosterParams>,
}

impl<'a> FitRequest<'a> {
    /// A plain training call: no eval sets, no early stopping, silent.
    #[must_use]
    pub fn new(x: ArrayView2<'a, f64>, y: ArrayView1<'a, f64>) -> Self {
        Self {
            x,
            y,
            sample_weight: None,
            eval_sets: Vec::new(),
            eval_metric: None,
            early_stopping_rounds: None,
            verbose: false,
            categorical_features: &[],
            extra: None,
        }
    }

    /// Attach the caller's passthrough options, with `sample_weight` already
    /// aligned to `x`.
    #[must_use]
    pub fn with_options(
        mut self,
        options: &'a FitOptions,
        sample_weight: Option<ArrayView1<'a, f64>>,
    ) -> Self {
        self.sample_weight = sample_weight;
        self.categorical_features = &options.categorical_features;
        self.extra = Some(&options.extra);
        self
    }

    #[must_use]
    pub fn with_eval_set(mut self, eval_set: EvalSet<'a>) -> Self {
        self.eval_sets.push(eval_set);
        self
    }

    #[must_use]
    pub fn with_eval_metric(mut self, metric: &'a str) -> Self {
        self.eval_metric = Some(metric);
        self
    }

    #[must_use]
    pub fn with_early_stopping_rounds(mut self, rounds: Option<u32>) -> Self {
        self.early_stopping_rounds = rounds;
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Options forwarded verbatim to every training call.
///
/// `sample_weight` is row-aligned with the training data; during tuning it is
/// sliced with the same partition as the features.
#[derive(Debug, Clone, Default)]
pub struct FitOptions {
    pub sample_weight: Option<Array1<f64>>,
    pub categorical_features: Vec<usize>,
    pub extra: BoosterParams,
}

impl FitOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sample_weight(mut self, weights: Array1<f64>) -> Self {
        self.sample_weight = Some(weights);
        self
    }

    #[must_use]
    pub fn categorical_features(mut self, columns: Vec<usize>) -> Self {
        self.categorical_features = columns;
        self
    }

    #[must_use]
    pub fn extra(mut self, params: BoosterParams) -> Self {
        self.extra = params;
        self
    }
}

/// Kinds of non-fatal booster diagnostics the learner knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// The booster found `early_stopping_rounds` both in its parameters and
    /// as a fit argument, and used the parameter.
    EarlyStoppingRoundsOverridden,

    /// Anything else.
    Other,
}

impl DiagnosticKind {
    /// Classify a raw library message.
    ///
    /// ```
    /// use gbm_autosplit::DiagnosticKind;
    ///
    /// let kind = DiagnosticKind::classify(
    ///     "Found `early_stopping_rounds` in params. Will use it instead of argument",
    /// );
    /// assert_eq!(kind, DiagnosticKind::EarlyStoppingRoundsOverridden);
    /// ```
    #[must_use]
    pub fn classify(message: &str) -> Self {
        if message.contains("Found `early_stopping_rounds` in params") {
            DiagnosticKind::EarlyStoppingRoundsOverridden
        } else {
            DiagnosticKind::Other
        }
    }
}

/// A non-fatal message emitted by a booster during training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic, classifying the message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: DiagnosticKind::classify(&message),
            message,
        }
    }
}

/// Receives diagnostics for the duration of one training call.
///
/// Suppressed kinds are logged at DEBUG and counted; everything else is
/// logged at WARN.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    suppressed: Vec<DiagnosticKind>,
    suppressed_count: Cell<usize>,
}

impl DiagnosticSink {
    /// A sink that forwards every diagnostic.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that silences `kind` and forwards everything else.
    #[must_use]
    pub fn suppressing(kind: DiagnosticKind) -> Self {
        Self {
            suppressed: vec![kind],
            suppressed_count: Cell::new(0),
        }
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        if self.suppressed.contains(&diagnostic.kind) {
            self.suppressed_count.set(self.suppressed_count.get() + 1);
            debug!(kind = ?diagnostic.kind, "Suppressed booster diagnostic: {}", diagnostic.message);
        } else {
            warn!("Booster: {}", diagnostic.message);
        }
    }

    /// How many diagnostics were silenced so far.
    #[must_use]
    pub fn suppressed_count(&self) -> usize {
        self.suppressed_count.get()
    }
}

//! Configuration for the auto-split learner.
//!
//! [`AutoSplitConfig`] holds the orchestration-only settings. Native booster
//! hyperparameters are kept separately in [`BoosterParams`](crate::BoosterParams)
//! and are never interpreted here.
//!
//! # Example
//!
//! ```
//! use gbm_autosplit::{AutoSplitConfig, Task};
//!
//! let config = AutoSplitConfig::builder()
//!     .task(Task::Regression)
//!     .max_n_estimators(2000)
//!     .ratio_training(0.75)
//!     .early_stopping_rounds(50)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.eval_metric, "rmse");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AutoSplitError, Result};

/// Default upper bound on boosting iterations.
pub const DEFAULT_MAX_N_ESTIMATORS: usize = 5000;

/// Default fraction of rows used for training during tuning.
pub const DEFAULT_RATIO_TRAINING: f64 = 0.8;

/// Default early-stopping patience.
pub const DEFAULT_EARLY_STOPPING_ROUNDS: u32 = 100;

/// The kind of model being boosted.
///
/// Only affects defaults (the evaluation metric and, for the Python
/// delegate, which estimator class is instantiated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Task {
    /// Discrete class labels.
    #[default]
    Classification,

    /// Continuous targets.
    Regression,
}

impl Task {
    /// Returns the string representation of the task.
    ///
    /// # Examples
    ///
    /// ```
    /// use gbm_autosplit::Task;
    ///
    /// assert_eq!(Task::Classification.as_str(), "classification");
    /// assert_eq!(Task::Regression.as_str(), "regression");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Classification => "classification",
            Task::Regression => "regression",
        }
    }

    /// The evaluation metric used when none is configured explicitly.
    #[must_use]
    pub fn default_metric(&self) -> &'static str {
        match self {
            Task::Classification => "auc",
            Task::Regression => "rmse",
        }
    }
}

/// Orchestration settings for [`AutoSplitLearner`](crate::AutoSplitLearner).
///
/// Use [`AutoSplitConfig::builder()`] for validated construction. The struct
/// also deserializes from JSON; missing fields take their defaults (a missing
/// `eval_metric` follows `task`), and [`validate()`](Self::validate) runs
/// again when a learner is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct AutoSplitConfig {
    /// Classification or regression (default: classification).
    pub task: Task,

    /// Estimator count handed to the booster before tuning (default: 5000).
    ///
    /// Tuning can only lower it. When the tuned value equals this ceiling a
    /// warning is logged, since the validation curve was likely still improving.
    pub max_n_estimators: usize,

    /// Fraction of rows used for training during tuning (default: 0.8).
    ///
    /// Must be in `(0.0, 1.0)`. The remaining rows form the validation set.
    pub ratio_training: f64,

    /// Metric identifier passed to the booster for the validation set.
    pub eval_metric: String,

    /// Derive `min_child_samples` as `ceil(ratio * sample_size)` (default: off).
    ///
    /// Must be in `(0.0, 1.0]` when set.
    pub ratio_min_child_samples: Option<f64>,

    /// Early-stopping patience in rounds (default: 100).
    ///
    /// `None` or `Some(0)` disables auto-tuning: the learner then fits once
    /// on the full data with `max_n_estimators` iterations.
    pub early_stopping_rounds: Option<u32>,

    /// Verbosity flag forwarded to the final full-data training call.
    ///
    /// The tuning call is always silent.
    pub verbose: bool,
}

impl Default for AutoSplitConfig {
    fn default() -> Self {
        Self::for_task(Task::default())
    }
}

impl AutoSplitConfig {
    /// Create a new builder for `AutoSplitConfig`.
    #[must_use]
    pub fn builder() -> AutoSplitConfigBuilder {
        AutoSplitConfigBuilder::default()
    }

    /// Default configuration for `task`, with the task's default metric.
    #[must_use]
    pub fn for_task(task: Task) -> Self {
        Self {
            task,
            max_n_estimators: DEFAULT_MAX_N_ESTIMATORS,
            ratio_training: DEFAULT_RATIO_TRAINING,
            eval_metric: task.default_metric().to_string(),
            ratio_min_child_samples: None,
            early_stopping_rounds: Some(DEFAULT_EARLY_STOPPING_ROUNDS),
            verbose: false,
        }
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AutoSplitConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns `true` if the configured patience enables auto-tuning.
    #[must_use]
    pub fn tuning_enabled(&self) -> bool {
        self.early_stopping_rounds.is_some_and(|rounds| rounds > 0)
    }

    /// Check every orchestration setting.
    ///
    /// # Errors
    ///
    /// Returns [`AutoSplitError::InvalidConfig`] if:
    /// - `max_n_estimators` is 0
    /// - `ratio_training` is not in range `(0.0, 1.0)`
    /// - `ratio_min_child_samples` is set and not in range `(0.0, 1.0]`
    /// - `eval_metric` is empty
    pub fn validate(&self) -> Result<()> {
        if self.max_n_estimators == 0 {
            return Err(AutoSplitError::InvalidConfig(
                "max_n_estimators must be at least 1".to_string(),
            ));
        }

        if !(self.ratio_training > 0.0 && self.ratio_training < 1.0) {
            return Err(AutoSplitError::InvalidConfig(format!(
                "ratio_training must be between 0.0 and 1.0 (exclusive), got {}",
                self.ratio_training
            )));
        }

        if let Some(ratio) = self.ratio_min_child_samples {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(AutoSplitError::InvalidConfig(format!(
                    "ratio_min_child_samples must be in (0.0, 1.0], got {ratio}"
                )));
            }
        }

        if self.eval_metric.trim().is_empty() {
            return Err(AutoSplitError::InvalidConfig(
                "eval_metric must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Deserialization shape of [`AutoSplitConfig`], with the metric left optional.
#[derive(Deserialize)]
#[serde(default)]
struct RawConfig {
    task: Task,
    max_n_estimators: usize,
    ratio_training: f64,
    eval_metric: Option<String>,
    ratio_min_child_samples: Option<f64>,
    early_stopping_rounds: Option<u32>,
    verbose: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        let defaults = AutoSplitConfig::default();
        Self {
            task: defaults.task,
            max_n_estimators: defaults.max_n_estimators,
            ratio_training: defaults.ratio_training,
            eval_metric: None,
            ratio_min_child_samples: defaults.ratio_min_child_samples,
            early_stopping_rounds: defaults.early_stopping_rounds,
            verbose: defaults.verbose,
        }
    }
}

impl From<RawConfig> for AutoSplitConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            task: raw.task,
            max_n_estimators: raw.max_n_estimators,
            ratio_training: raw.ratio_training,
            eval_metric: raw
                .eval_metric
                .unwrap_or_else(|| raw.task.default_metric().to_string()),
            ratio_min_child_samples: raw.ratio_min_child_samples,
            early_stopping_rounds: raw.early_stopping_rounds,
            verbose: raw.verbose,
        }
    }
}

/// Builder for [`AutoSplitConfig`].
///
/// Unless [`eval_metric()`](Self::eval_metric) is called, the metric follows
/// the selected [`Task`].
#[derive(Debug, Clone, Default)]
pub struct AutoSplitConfigBuilder {
    task: Task,
    max_n_estimators: Option<usize>,
    ratio_training: Option<f64>,
    eval_metric: Option<String>,
    ratio_min_child_samples: Option<f64>,
    early_stopping_rounds: Option<Option<u32>>,
    verbose: bool,
}

impl AutoSplitConfigBuilder {
    /// Set the task (default: classification).
    #[must_use]
    pub fn task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    /// Set the estimator ceiling (default: 5000).
    #[must_use]
    pub fn max_n_estimators(mut self, n: usize) -> Self {
        self.max_n_estimators = Some(n);
        self
    }

    /// Set the training fraction used during tuning (default: 0.8).
    #[must_use]
    pub fn ratio_training(mut self, ratio: f64) -> Self {
        self.ratio_training = Some(ratio);
        self
    }

    /// Set the evaluation metric identifier.
    #[must_use]
    pub fn eval_metric(mut self, metric: impl Into<String>) -> Self {
        self.eval_metric = Some(metric.into());
        self
    }

    /// Derive `min_child_samples` from the sample size with this ratio.
    #[must_use]
    pub fn ratio_min_child_samples(mut self, ratio: f64) -> Self {
        self.ratio_min_child_samples = Some(ratio);
        self
    }

    /// Set the early-stopping patience (default: 100). `0` disables tuning.
    #[must_use]
    pub fn early_stopping_rounds(mut self, rounds: u32) -> Self {
        self.early_stopping_rounds = Some(Some(rounds));
        self
    }

    /// Disable auto-tuning entirely.
    #[must_use]
    pub fn disable_early_stopping(mut self) -> Self {
        self.early_stopping_rounds = Some(None);
        self
    }

    /// Forward `verbose = true` to the final training call.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// See [`AutoSplitConfig::validate`].
    pub fn build(self) -> Result<AutoSplitConfig> {
        let defaults = AutoSplitConfig::for_task(self.task);
        let config = AutoSplitConfig {
            task: self.task,
            max_n_estimators: self.max_n_estimators.unwrap_or(defaults.max_n_estimators),
            ratio_training: self.ratio_training.unwrap_or(defaults.ratio_training),
            eval_metric: self.eval_metric.unwrap_or(defaults.eval_metric),
            ratio_min_child_samples: self.ratio_min_child_samples,
            early_stopping_rounds: self
                .early_stopping_rounds
                .unwrap_or(defaults.early_stopping_rounds),
            verbose: self.verbose,
        };
        config.validate()?;
        Ok(config)
    }
}

static_assertions::assert_impl_all!(AutoSplitConfig: Send, Sync);

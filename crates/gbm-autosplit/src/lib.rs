//! gbm-autosplit: pick a gradient boosting model's tree count automatically.
//!
//! A boosting library already knows how to stop early on a validation set.
//! This crate wraps a booster so that a plain `fit(x, y)` does the rest:
//! it carves out a random validation split, trains with early stopping to
//! find the best iteration, pins the estimator count to it and then refits
//! on every row with early stopping switched off.
//!
//! # Features
//!
//! - **Auto-split tuning**: estimator count chosen per fit, capped by
//!   `max_n_estimators`
//! - **Refit-safe**: tuning runs once; later fits reuse the pinned count
//! - **Leaf-size scaling**: optional `min_child_samples` derived from the
//!   number of rows each fit actually sees
//! - **Seedable splits**: the random source is an injectable [`Splitter`]
//! - **DataFrame input**: [`AutoSplitLearner::fit_frame`] over polars frames
//! - **LightGBM bridge**: [`python::LightGbmBooster`] behind the `python`
//!   feature
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gbm_autosplit::{AutoSplitConfig, AutoSplitLearner, FitOptions, RandomSplitter};
//! use gbm_autosplit::python::LightGbmBooster;
//!
//! gbm_autosplit::python::initialize()?;
//!
//! let config = AutoSplitConfig::builder()
//!     .max_n_estimators(500)
//!     .early_stopping_rounds(50)
//!     .ratio_min_child_samples(0.01)
//!     .build()?;
//!
//! let mut learner = AutoSplitLearner::new(LightGbmBooster::new(config.task), config)?
//!     .with_splitter(RandomSplitter::seeded(42));
//!
//! learner.fit(x.view(), y.view(), &FitOptions::new())?;
//! println!("chosen n_estimators: {}", learner.n_estimators());
//! ```
//!
//! # Architecture
//!
//! ```text
//! AutoSplitLearner::fit
//!   ├── min_child_samples from training subset size
//!   ├── auto_split_fit
//!   │     ├── gate: patience > 0 ?
//!   │     ├── tuning: Splitter ──► Booster::fit(train, eval=validation)
//!   │     │           n_estimators = best iteration
//!   │     └── final: early stopping off
//!   ├── min_child_samples from full sample size
//!   └── Booster::fit(all rows)
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias over
//! [`AutoSplitError`]. Booster failures keep their message and stay
//! reachable through [`AutoSplitError::booster_error`].
//!
//! # Logging
//!
//! The crate logs through `tracing` and never installs a subscriber. Hitting
//! the estimator ceiling is a WARN; booster diagnostics other than the
//! expected early-stopping override notice are WARNs too.

mod autosplit;
mod booster;
mod config;
mod error;
pub mod frame;
mod history;
mod learner;
mod params;
#[cfg(feature = "python")]
pub mod python;
mod split;
#[cfg(test)]
mod testing;

// Re-export public API
//
// Configuration types
pub use config::{
    AutoSplitConfig, AutoSplitConfigBuilder, DEFAULT_EARLY_STOPPING_ROUNDS,
    DEFAULT_MAX_N_ESTIMATORS, DEFAULT_RATIO_TRAINING, Task,
};
// Error types
pub use error::{AutoSplitError, BoxError, Result};
// Booster seam
pub use booster::{
    Booster, Diagnostic, DiagnosticKind, DiagnosticSink, EvalSet, FitOptions, FitRequest,
};
pub use params::{BoosterParams, MIN_CHILD_SAMPLES};
// Splitting
pub use split::{Partition, RandomSplitter, SplitData, Splitter, split_xy, training_size};
// Orchestration
pub use autosplit::auto_split_fit;
pub use history::{EvalHistory, metric_higher_is_better, tuned_n_estimators};
pub use learner::{AutoSplitLearner, min_child_samples_for};
pub use frame::FrameData;

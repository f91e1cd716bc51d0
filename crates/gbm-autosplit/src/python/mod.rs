//! Python interop module.
//!
//! Drives scikit-learn style LightGBM estimators through pyo3. Only built
//! with the `python` feature.

pub mod conversion;
pub mod lightgbm;
pub mod runtime;

pub use conversion::PythonError;
pub use lightgbm::LightGbmBooster;
pub use runtime::{initialize, is_initialized};

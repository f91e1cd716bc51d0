//! Python interpreter start-up.
//!
//! [`initialize()`] starts the interpreter and checks that `numpy` and
//! `lightgbm` import. The outcome is cached, so later calls are free.
//!
//! ```rust,ignore
//! gbm_autosplit::python::initialize()?;
//! let booster = LightGbmBooster::new(Task::Classification);
//! ```

use std::sync::OnceLock;

use tracing::{debug, info};

use crate::python::conversion::PythonError;

/// Result of the one-time start-up, kept as the error message.
static INIT_RESULT: OnceLock<Result<(), String>> = OnceLock::new();

/// Modules the LightGBM booster needs.
const REQUIRED_MODULES: [&str; 2] = ["numpy", "lightgbm"];

/// Start the interpreter and verify the required modules.
///
/// Safe to call from several threads; only the first call does any work.
///
/// # Errors
///
/// Returns a [`PythonError`] with exception `RuntimeInit` if a required
/// module fails to import.
#[must_use = "initialization may fail; check the Result"]
pub fn initialize() -> Result<(), PythonError> {
    match INIT_RESULT.get_or_init(do_initialize) {
        Ok(()) => Ok(()),
        Err(message) => Err(PythonError {
            exception: "RuntimeInit".to_string(),
            message: message.clone(),
        }),
    }
}

fn do_initialize() -> Result<(), String> {
    pyo3::Python::initialize();

    pyo3::Python::attach(|py| {
        for module in REQUIRED_MODULES {
            py.import(module)
                .map_err(|e| format!("Failed to import {module}: {e}"))?;
            debug!("Imported {}", module);
        }
        Ok::<(), String>(())
    })?;

    info!("Python runtime ready");
    Ok(())
}

/// Returns `true` once [`initialize()`] has succeeded.
pub fn is_initialized() -> bool {
    INIT_RESULT.get().is_some_and(|r| r.is_ok())
}

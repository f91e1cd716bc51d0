//! LightGBM's scikit-learn estimators as a [`Booster`].
//!
//! A fresh `LGBMClassifier`/`LGBMRegressor` is built for every fit from the
//! current hyperparameters, so the estimator count and patience set by the
//! learner always reach LightGBM. Python warnings raised while fitting are
//! recorded and handed to the [`DiagnosticSink`], which is how the
//! "Found `early_stopping_rounds` in params" notice gets filtered.

use ndarray::{Array1, Array2, ArrayView2};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyTuple};
use serde_json::Value;
use tracing::debug;

use crate::booster::{Booster, Diagnostic, DiagnosticSink, FitRequest};
use crate::config::{DEFAULT_MAX_N_ESTIMATORS, Task};
use crate::params::BoosterParams;
use crate::python::conversion::{
    PythonError, map_python_error, matrix_to_numpy, numpy_to_vector, params_into_dict,
    vector_to_numpy,
};

/// LightGBM parameter names that switch on early stopping.
const EARLY_STOPPING_ALIASES: [&str; 4] = [
    "early_stopping_rounds",
    "early_stopping_round",
    "early_stopping",
    "n_iter_no_change",
];

/// A LightGBM estimator driven through pyo3.
#[derive(Debug)]
pub struct LightGbmBooster {
    task: Task,
    params: BoosterParams,
    n_estimators: usize,
    early_stopping_rounds: Option<u32>,
    best_iteration: Option<usize>,
    model: Option<Py<PyAny>>,
}

impl LightGbmBooster {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            params: BoosterParams::new(),
            n_estimators: DEFAULT_MAX_N_ESTIMATORS,
            early_stopping_rounds: None,
            best_iteration: None,
            model: None,
        }
    }

    /// Start from the given native hyperparameters.
    #[must_use]
    pub fn with_params(mut self, params: BoosterParams) -> Self {
        self.params = params;
        self
    }

    pub fn task(&self) -> Task {
        self.task
    }

    fn estimator_class(&self) -> &'static str {
        match self.task {
            Task::Classification => "LGBMClassifier",
            Task::Regression => "LGBMRegressor",
        }
    }

    /// Class probabilities, one row per sample.
    ///
    /// # Errors
    ///
    /// Returns a [`PythonError`] if the model is unfitted, is a regressor, or
    /// LightGBM fails.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PythonError> {
        let model = self.fitted_model()?;
        Python::attach(|py| {
            let model = model.bind(py);
            let inner = || -> PyResult<Array2<f64>> {
                let rows: Vec<Vec<f64>> = model
                    .call_method1("predict_proba", (matrix_to_numpy(py, x)?,))?
                    .call_method0("tolist")?
                    .extract()?;
                let n_classes = rows.first().map_or(0, Vec::len);
                let flat: Vec<f64> = rows.into_iter().flatten().collect();
                Array2::from_shape_vec((x.nrows(), n_classes), flat).map_err(|e| {
                    pyo3::exceptions::PyValueError::new_err(format!(
                        "unexpected predict_proba shape: {e}"
                    ))
                })
            };
            inner().map_err(|e| map_python_error(py, e))
        })
    }

    fn fitted_model(&self) -> Result<&Py<PyAny>, PythonError> {
        self.model.as_ref().ok_or_else(|| PythonError {
            exception: "NotFittedError".to_string(),
            message: "LightGBM model has not been fitted".to_string(),
        })
    }

    /// Constructor parameters for one fit.
    ///
    /// Early stopping comes from the request alone: any patience (or alias)
    /// in the passthrough bundle is dropped, and a disabled patience is sent
    /// as `None` so LightGBM cannot fall back to one.
    fn estimator_params(&self, early_stopping_rounds: Option<u32>, verbose: bool) -> BoosterParams {
        let mut params = self.params.clone();
        for alias in EARLY_STOPPING_ALIASES {
            params.remove(alias);
        }
        params.set("n_estimators", self.n_estimators);
        match early_stopping_rounds.filter(|rounds| *rounds > 0) {
            Some(rounds) => params.set("early_stopping_rounds", rounds),
            None => params.set("early_stopping_rounds", Value::Null),
        };
        if !verbose {
            params.set("verbose", -1);
        }
        params
    }

    fn build_estimator<'py>(
        &self,
        py: Python<'py>,
        request: &FitRequest<'_>,
    ) -> PyResult<Bound<'py, PyAny>> {
        let kwargs = PyDict::new(py);
        let params = self.estimator_params(request.early_stopping_rounds, request.verbose);
        params_into_dict(py, &params, &kwargs)?;

        py.import("lightgbm")?
            .getattr(self.estimator_class())?
            .call((), Some(&kwargs))
    }

    fn fit_kwargs<'py>(
        &self,
        py: Python<'py>,
        request: &FitRequest<'_>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let kwargs = PyDict::new(py);
        if let Some(extra) = request.extra {
            params_into_dict(py, extra, &kwargs)?;
        }

        if let Some(weights) = request.sample_weight {
            kwargs.set_item("sample_weight", vector_to_numpy(py, weights)?)?;
        }

        if !request.eval_sets.is_empty() {
            let eval_set = PyList::empty(py);
            let eval_weights = PyList::empty(py);
            let mut any_weights = false;
            for set in &request.eval_sets {
                let pair = PyTuple::new(
                    py,
                    [matrix_to_numpy(py, set.x)?, vector_to_numpy(py, set.y)?],
                )?;
                eval_set.append(pair)?;
                match set.sample_weight {
                    Some(weights) => {
                        any_weights = true;
                        eval_weights.append(vector_to_numpy(py, weights)?)?;
                    }
                    None => eval_weights.append(py.None())?,
                }
            }
            kwargs.set_item("eval_set", eval_set)?;
            if any_weights {
                kwargs.set_item("eval_sample_weight", eval_weights)?;
            }
        }

        if let Some(metric) = request.eval_metric {
            kwargs.set_item("eval_metric", metric)?;
        }

        if !request.categorical_features.is_empty() {
            kwargs.set_item("categorical_feature", request.categorical_features.to_vec())?;
        }

        Ok(kwargs)
    }

    /// Fit `model` with Python warnings recorded, returning the fit outcome
    /// and the warning messages.
    fn fit_recording_warnings(
        py: Python<'_>,
        model: &Bound<'_, PyAny>,
        args: (Bound<'_, PyAny>, Bound<'_, PyAny>),
        kwargs: &Bound<'_, PyDict>,
    ) -> PyResult<(PyResult<()>, Vec<String>)> {
        let warnings = py.import("warnings")?;
        let catch_kwargs = PyDict::new(py);
        catch_kwargs.set_item("record", true)?;
        let catcher = warnings.call_method("catch_warnings", (), Some(&catch_kwargs))?;
        let recorded = catcher.call_method0("__enter__")?;
        warnings.call_method1("simplefilter", ("always",))?;

        let outcome = model.call_method("fit", args, Some(kwargs)).map(|_| ());

        catcher.call_method1("__exit__", (py.None(), py.None(), py.None()))?;

        let mut messages = Vec::new();
        for item in recorded.try_iter()? {
            messages.push(item?.getattr("message")?.str()?.to_string());
        }
        Ok((outcome, messages))
    }
}

impl Booster for LightGbmBooster {
    type Error = PythonError;

    fn fit(
        &mut self,
        request: FitRequest<'_>,
        diagnostics: &DiagnosticSink,
    ) -> Result<(), Self::Error> {
        let (model, best_iteration) = Python::attach(|py| {
            let inner = || -> PyResult<(Py<PyAny>, Option<usize>)> {
                let model = self.build_estimator(py, &request)?;
                let kwargs = self.fit_kwargs(py, &request)?;
                let args = (
                    matrix_to_numpy(py, request.x)?,
                    vector_to_numpy(py, request.y)?,
                );

                let (outcome, messages) =
                    Self::fit_recording_warnings(py, &model, args, &kwargs)?;
                for message in messages {
                    diagnostics.report(Diagnostic::from_message(message));
                }
                outcome?;

                let best: Option<usize> = model.getattr("best_iteration_")?.extract()?;
                Ok((model.unbind(), best.filter(|best| *best > 0)))
            };
            inner().map_err(|e| map_python_error(py, e))
        })?;

        debug!(best_iteration = ?best_iteration, "LightGBM fit finished");
        self.model = Some(model);
        self.best_iteration = best_iteration;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, Self::Error> {
        let model = self.fitted_model()?;
        Python::attach(|py| {
            let model = model.bind(py);
            let inner = || -> PyResult<Array1<f64>> {
                let predictions = model.call_method1("predict", (matrix_to_numpy(py, x)?,))?;
                numpy_to_vector(&predictions)
            };
            inner().map_err(|e| map_python_error(py, e))
        })
    }

    fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    fn set_n_estimators(&mut self, n_estimators: usize) {
        self.n_estimators = n_estimators;
    }

    fn early_stopping_rounds(&self) -> Option<u32> {
        self.early_stopping_rounds
    }

    fn set_early_stopping_rounds(&mut self, rounds: Option<u32>) {
        self.early_stopping_rounds = rounds;
    }

    fn best_iteration(&self) -> Option<usize> {
        self.best_iteration
    }

    fn params(&self) -> &BoosterParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut BoosterParams {
        &mut self.params
    }
}

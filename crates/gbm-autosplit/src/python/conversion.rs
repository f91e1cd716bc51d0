//! Conversions between Rust values and Python objects.

use ndarray::{Array1, ArrayView1, ArrayView2};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use thiserror::Error;

use crate::params::BoosterParams;

/// An exception raised on the Python side.
#[derive(Debug, Clone, Error)]
#[error("{exception}: {message}")]
pub struct PythonError {
    /// Exception class name, e.g. `ValueError`.
    pub exception: String,
    pub message: String,
}

/// Capture the exception class and message of `err`.
pub fn map_python_error(py: Python<'_>, err: PyErr) -> PythonError {
    let exception = err
        .get_type(py)
        .qualname()
        .map(|s| s.to_string())
        .unwrap_or_default();

    PythonError {
        exception,
        message: err.value(py).to_string(),
    }
}

/// Convert a JSON value to the equivalent Python object.
pub fn json_to_pyany<'py>(
    py: Python<'py>,
    value: &serde_json::Value,
) -> PyResult<Bound<'py, PyAny>> {
    match value {
        serde_json::Value::Null => Ok(py.None().into_bound(py)),
        serde_json::Value::Bool(b) => Ok(b.into_pyobject(py)?.to_owned().into_any()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.into_pyobject(py)?.into_any())
            } else if let Some(u) = n.as_u64() {
                Ok(u.into_pyobject(py)?.into_any())
            } else {
                Ok(n.as_f64().unwrap_or(f64::NAN).into_pyobject(py)?.into_any())
            }
        }
        serde_json::Value::String(s) => Ok(s.into_pyobject(py)?.into_any()),
        serde_json::Value::Array(items) => {
            let list = PyList::empty(py);
            for item in items {
                list.append(json_to_pyany(py, item)?)?;
            }
            Ok(list.into_any())
        }
        serde_json::Value::Object(map) => {
            let dict = PyDict::new(py);
            for (k, v) in map {
                dict.set_item(k, json_to_pyany(py, v)?)?;
            }
            Ok(dict.into_any())
        }
    }
}

/// Copy every parameter into `dict`, overwriting existing keys.
pub fn params_into_dict(
    py: Python<'_>,
    params: &BoosterParams,
    dict: &Bound<'_, PyDict>,
) -> PyResult<()> {
    for (key, value) in params.iter() {
        dict.set_item(key, json_to_pyany(py, value)?)?;
    }
    Ok(())
}

/// A 2-D `numpy.ndarray` with the rows of `x`.
pub fn matrix_to_numpy<'py>(
    py: Python<'py>,
    x: ArrayView2<'_, f64>,
) -> PyResult<Bound<'py, PyAny>> {
    let rows: Vec<Vec<f64>> = x.outer_iter().map(|row| row.to_vec()).collect();
    py.import("numpy")?.call_method1("asarray", (rows,))
}

/// A 1-D `numpy.ndarray` with the values of `v`.
pub fn vector_to_numpy<'py>(
    py: Python<'py>,
    v: ArrayView1<'_, f64>,
) -> PyResult<Bound<'py, PyAny>> {
    py.import("numpy")?.call_method1("asarray", (v.to_vec(),))
}

/// Read a 1-D numeric array-like back into Rust.
pub fn numpy_to_vector(array: &Bound<'_, PyAny>) -> PyResult<Array1<f64>> {
    let values: Vec<f64> = array.call_method0("tolist")?.extract()?;
    Ok(Array1::from_vec(values))
}

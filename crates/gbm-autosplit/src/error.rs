//! Error types for the gbm-autosplit crate.
//!
//! [`AutoSplitError`] is returned by every fallible operation. Failures raised
//! by the wrapped booster are kept intact inside [`AutoSplitError::Booster`]:
//! the message is displayed verbatim and the original error stays reachable
//! through [`std::error::Error::source`].
//!
//! Errors are serializable as `{ "code", "message" }` so that callers embedding
//! the learner behind an IPC boundary can forward them unchanged.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Boxed error produced by a [`Booster`](crate::Booster) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for auto-split fitting.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AutoSplitError {
    /// Row counts of features, labels or weights disagree.
    #[error("Shape mismatch in {context}: {features} feature rows but {labels} labels")]
    ShapeMismatch {
        /// The operation that detected the mismatch.
        context: &'static str,
        /// Number of rows on the feature (or weight) side.
        features: usize,
        /// Number of labels.
        labels: usize,
    },

    /// Invalid learner configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input data cannot be used for training or inference.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Column was not found in the DataFrame.
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    /// `predict` was called before a successful `fit`.
    #[error("Learner has not been fitted")]
    NotFitted,

    /// The wrapped booster failed. Displayed exactly as the booster reported it.
    #[error("{0}")]
    Booster(#[source] BoxError),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AutoSplitError {
    /// Wrap an error raised by the booster.
    pub fn booster(err: impl Into<BoxError>) -> Self {
        AutoSplitError::Booster(err.into())
    }

    /// Get error code for callers that dispatch on the failure kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NotFitted => "NOT_FITTED",
            Self::Booster(_) => "BOOSTER_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// Returns the booster's original error if it is of type `E`.
    pub fn booster_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Booster(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl Serialize for AutoSplitError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AutoSplitError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for auto-split operations.
pub type Result<T> = std::result::Result<T, AutoSplitError>;

static_assertions::assert_impl_all!(AutoSplitError: Send, Sync);

/// Check that two row counts agree, labeling the failure with `context`.
pub(crate) fn ensure_rows(context: &'static str, features: usize, labels: usize) -> Result<()> {
    if features == labels {
        Ok(())
    } else {
        Err(AutoSplitError::ShapeMismatch {
            context,
            features,
            labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("num_leaves must be greater than 1")]
    struct FakeBoosterError;

    #[test]
    fn test_error_code() {
        assert_eq!(AutoSplitError::NotFitted.error_code(), "NOT_FITTED");
        assert_eq!(
            AutoSplitError::ColumnNotFound("y".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_shape_mismatch_is_labeled() {
        let err = ensure_rows("split_xy", 10, 9).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("split_xy"));
        assert!(message.contains("10"));
        assert!(message.contains("9"));
        assert!(ensure_rows("split_xy", 3, 3).is_ok());
    }

    #[test]
    fn test_booster_error_is_verbatim() {
        let err = AutoSplitError::booster(FakeBoosterError);
        assert_eq!(err.to_string(), "num_leaves must be greater than 1");
        assert!(err.booster_error::<FakeBoosterError>().is_some());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_serialization() {
        let error = AutoSplitError::InvalidConfig("ratio_training".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("INVALID_CONFIG"));
        assert!(json.contains("ratio_training"));
    }
}

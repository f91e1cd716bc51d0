//! Passthrough bundle for native booster hyperparameters.
//!
//! The learner never re-declares the booster's parameter surface. Whatever
//! the caller puts into [`BoosterParams`] reaches the booster untouched; the
//! only key the learner writes itself is [`MIN_CHILD_SAMPLES`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the minimum-samples-per-leaf hyperparameter.
pub const MIN_CHILD_SAMPLES: &str = "min_child_samples";

/// Native hyperparameters forwarded verbatim to the booster.
///
/// # Example
///
/// ```
/// use gbm_autosplit::BoosterParams;
///
/// let params = BoosterParams::new()
///     .with("num_leaves", 63)
///     .with("learning_rate", 0.05)
///     .with("objective", "binary");
///
/// assert_eq!(params.get_usize("num_leaves"), Some(63));
/// assert_eq!(params.get_f64("learning_rate"), Some(0.05));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoosterParams(Map<String, Value>);

impl BoosterParams {
    /// Create an empty bundle; every parameter defers to the booster default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a parameter, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a parameter so the booster falls back to its own default.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key)
            .and_then(Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
    }

    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Overwrite entries with those of `other`.
    pub fn merge(&mut self, other: BoosterParams) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for BoosterParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for BoosterParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

static_assertions::assert_impl_all!(BoosterParams: Send, Sync);

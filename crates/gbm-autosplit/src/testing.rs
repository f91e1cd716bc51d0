//! Test double for the booster seam.

use ndarray::{Array1, ArrayView2};
use thiserror::Error;

use crate::booster::{Booster, Diagnostic, DiagnosticSink, FitRequest};
use crate::params::{BoosterParams, MIN_CHILD_SAMPLES};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeBoosterError(pub String);

/// What the booster saw in one `fit` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FitCall {
    pub rows: usize,
    pub eval_rows: Vec<usize>,
    pub eval_metric: Option<String>,
    pub early_stopping_rounds: Option<u32>,
    pub n_estimators: usize,
    pub min_child_samples: Option<usize>,
    pub verbose: bool,
    pub weight_rows: Option<usize>,
    pub eval_weight_rows: Option<usize>,
    pub categorical_features: Vec<usize>,
}

/// Records every call and reports a scripted best iteration.
#[derive(Debug, Default)]
pub struct RecordingBooster {
    params: BoosterParams,
    n_estimators: usize,
    early_stopping_rounds: Option<u32>,
    pub best_iteration: Option<usize>,
    /// Best iteration reported after an early-stopped fit (capped at `n_estimators`).
    pub report_best: Option<usize>,
    /// Messages reported to the diagnostic sink on every fit.
    pub diagnostics: Vec<String>,
    pub fail_with: Option<String>,
    pub calls: Vec<FitCall>,
}

impl RecordingBooster {
    pub fn reporting(best: usize) -> Self {
        Self {
            report_best: Some(best),
            ..Self::default()
        }
    }
}

impl Booster for RecordingBooster {
    type Error = FakeBoosterError;

    fn fit(
        &mut self,
        request: FitRequest<'_>,
        diagnostics: &DiagnosticSink,
    ) -> Result<(), Self::Error> {
        self.calls.push(FitCall {
            rows: request.x.nrows(),
            eval_rows: request.eval_sets.iter().map(|set| set.x.nrows()).collect(),
            eval_metric: request.eval_metric.map(str::to_string),
            early_stopping_rounds: request.early_stopping_rounds,
            n_estimators: self.n_estimators,
            min_child_samples: self.params.get_usize(MIN_CHILD_SAMPLES),
            verbose: request.verbose,
            weight_rows: request.sample_weight.map(|w| w.len()),
            eval_weight_rows: request
                .eval_sets
                .first()
                .and_then(|set| set.sample_weight)
                .map(|w| w.len()),
            categorical_features: request.categorical_features.to_vec(),
        });

        for message in &self.diagnostics {
            diagnostics.report(Diagnostic::from_message(message.clone()));
        }

        if let Some(message) = &self.fail_with {
            return Err(FakeBoosterError(message.clone()));
        }

        let early_stopped = !request.eval_sets.is_empty()
            && request.early_stopping_rounds.is_some_and(|rounds| rounds > 0);
        self.best_iteration = if early_stopped {
            self.report_best.map(|best| best.min(self.n_estimators))
        } else {
            None
        };
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, Self::Error> {
        Ok(Array1::from_elem(x.nrows(), self.n_estimators as f64))
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

/// Splitter wrapper counting how often a partition was requested.
#[derive(Debug)]
pub struct CountingSplitter {
    inner: crate::split::RandomSplitter,
    pub calls: usize,
}

impl CountingSplitter {
    pub fn new() -> Self {
        Self {
            inner: crate::split::RandomSplitter::seeded(0),
            calls: 0,
        }
    }
}

impl crate::split::Splitter for CountingSplitter {
    fn partition(&mut self, n_samples: usize, training_ratio: f64) -> crate::split::Partition {
        self.calls += 1;
        self.inner.partition(n_samples, training_ratio)
    }
}

/// In-memory log sink for the fmt subscriber.
#[derive(Clone, Default)]
struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with logs captured, returning its output and the WARN lines.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let output = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap();
    let warnings = String::from_utf8_lossy(&bytes)
        .lines()
        .filter(|line| line.contains("WARN"))
        .map(str::to_string)
        .collect();
    (output, warnings)
}

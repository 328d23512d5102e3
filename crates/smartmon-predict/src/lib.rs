//! Pluggable failure-prediction hook.
//!
//! The model itself is out of scope here: a predictor is just a function
//! over the current set of series names plus the configured model/action
//! strings. The scheduler invokes it once per scrape cycle, and the operator
//! can invoke it on demand.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use smartmon_types::{Result, SeriesName};

/// One invocation of the prediction hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub series: Vec<SeriesName>,
    pub model: String,
    pub action: String,
}

/// Failure-prediction hook over stored device history.
#[async_trait]
pub trait FailurePredictor: Send + Sync {
    async fn predict(&self, request: PredictionRequest) -> Result<()>;
}

#[async_trait]
impl<T: FailurePredictor + ?Sized> FailurePredictor for Arc<T> {
    async fn predict(&self, request: PredictionRequest) -> Result<()> {
        (**self).predict(request).await
    }
}

/// The default "trivial" model: no analysis, just visibility.
///
/// Logs what it was asked to evaluate; a real model plugs in behind the same
/// trait.
pub struct TrivialPredictor;

#[async_trait]
impl FailurePredictor for TrivialPredictor {
    async fn predict(&self, request: PredictionRequest) -> Result<()> {
        tracing::info!(
            series = request.series.len(),
            model = %request.model,
            action = %request.action,
            "Prediction cycle"
        );
        Ok(())
    }
}

/// Test predictor that records every invocation.
pub struct RecordingPredictor {
    calls: Mutex<Vec<PredictionRequest>>,
}

impl RecordingPredictor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Drain and return the recorded invocations.
    pub fn take_calls(&self) -> Vec<PredictionRequest> {
        std::mem::take(&mut self.calls.lock())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for RecordingPredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FailurePredictor for RecordingPredictor {
    async fn predict(&self, request: PredictionRequest) -> Result<()> {
        self.calls.lock().push(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trivial_predictor_succeeds() {
        let req = PredictionRequest {
            series: vec![SeriesName::from_raw("h:sda")],
            model: "trivial".into(),
            action: "warn".into(),
        };
        TrivialPredictor.predict(req).await.unwrap();
    }

    #[tokio::test]
    async fn test_recording_predictor_captures_requests() {
        let predictor = RecordingPredictor::new();
        let req = PredictionRequest {
            series: vec![],
            model: "trivial".into(),
            action: "warn".into(),
        };
        predictor.predict(req.clone()).await.unwrap();
        predictor.predict(req.clone()).await.unwrap();

        assert_eq!(predictor.call_count(), 2);
        let calls = predictor.take_calls();
        assert_eq!(calls[0], req);
        assert_eq!(predictor.call_count(), 0);
    }
}

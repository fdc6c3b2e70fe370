use crate::prediction::{Classifier, PredictionError};
use crate::selection::SelectedFile;
use crate::surface::Surface;
use std::sync::Arc;

pub const ANALYZING_MESSAGE: &str = "Analyzing skin tone...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Busy,
}

/// Drives the one-submission state machine:
/// `Idle --(submit, file present)--> Busy --(resolved)--> Idle`.
/// At most one request is in flight; re-submission while busy is a no-op.
pub struct Session<C: Classifier, S: Surface> {
    classifier: C,
    surface: Arc<S>,
    state: UiState,
}

impl<C: Classifier, S: Surface> Session<C, S> {
    pub fn new(classifier: C, surface: Arc<S>) -> Self {
        Self {
            classifier,
            surface,
            state: UiState::Idle,
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub async fn submit(&mut self, file: Option<&SelectedFile>) {
        if self.state == UiState::Busy {
            // Trigger is disabled while busy; nothing to do.
            return;
        }

        let Some(file) = file else {
            self.surface
                .render_error(&PredictionError::NoFileSelected.to_string());
            return;
        };

        let outcome = {
            let _busy = BusyGuard::enter(&mut self.state, Arc::clone(&self.surface));
            self.classifier.classify(file).await
        };

        match outcome {
            Ok(classification) => self.surface.render_result(&classification),
            Err(error) => {
                tracing::error!("Prediction failed: {}", error);
                self.surface.render_error(&error.to_string());
            }
        }
    }
}

/// Holds Busy for exactly the span of one request. Dropping restores Idle,
/// hides the busy indicator, and re-enables the trigger on every exit path,
/// unwinding included.
struct BusyGuard<'a, S: Surface> {
    state: &'a mut UiState,
    surface: Arc<S>,
}

impl<'a, S: Surface> BusyGuard<'a, S> {
    fn enter(state: &'a mut UiState, surface: Arc<S>) -> Self {
        *state = UiState::Busy;
        surface.set_trigger_enabled(false);
        surface.set_busy(true);
        surface.render_status(ANALYZING_MESSAGE);
        Self { state, surface }
    }
}

impl<S: Surface> Drop for BusyGuard<'_, S> {
    fn drop(&mut self) {
        *self.state = UiState::Idle;
        self.surface.set_busy(false);
        self.surface.set_trigger_enabled(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::Classification;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum SurfaceEvent {
        Preview(String),
        PreviewCleared,
        Status(String),
        Result(Classification),
        Error(String),
        Busy(bool),
        TriggerEnabled(bool),
    }

    #[derive(Default)]
    struct RecordingSurface {
        events: Mutex<Vec<SurfaceEvent>>,
    }

    impl RecordingSurface {
        fn push(&self, event: SurfaceEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<SurfaceEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Surface for RecordingSurface {
        fn show_preview(&self, data_uri: &str) {
            self.push(SurfaceEvent::Preview(data_uri.to_string()));
        }
        fn clear_preview(&self) {
            self.push(SurfaceEvent::PreviewCleared);
        }
        fn render_status(&self, text: &str) {
            self.push(SurfaceEvent::Status(text.to_string()));
        }
        fn render_result(&self, classification: &Classification) {
            self.push(SurfaceEvent::Result(classification.clone()));
        }
        fn render_error(&self, message: &str) {
            self.push(SurfaceEvent::Error(message.to_string()));
        }
        fn set_busy(&self, busy: bool) {
            self.push(SurfaceEvent::Busy(busy));
        }
        fn set_trigger_enabled(&self, enabled: bool) {
            self.push(SurfaceEvent::TriggerEnabled(enabled));
        }
    }

    #[derive(Clone)]
    enum StubOutcome {
        Success(Classification),
        ServerFailure(String),
    }

    struct StubClassifier {
        outcome: StubOutcome,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Classifier for StubClassifier {
        async fn classify(
            &self,
            _file: &SelectedFile,
        ) -> Result<Classification, PredictionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                StubOutcome::Success(classification) => Ok(classification.clone()),
                StubOutcome::ServerFailure(message) => {
                    Err(PredictionError::Server(message.clone()))
                }
            }
        }
    }

    fn sample_file() -> SelectedFile {
        SelectedFile {
            bytes: Bytes::from_static(b"fake image bytes"),
            file_name: "sample.png".to_string(),
            mime_type: "image/png",
        }
    }

    fn sample_classification() -> Classification {
        Classification {
            label: "Light (Type II)".to_string(),
            tip: "Use SPF 30-50 daily, moisturize regularly".to_string(),
            confidence: Some(0.812),
        }
    }

    #[tokio::test]
    async fn test_submit_without_file_renders_validation_and_skips_network() {
        let surface = Arc::new(RecordingSurface::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = StubClassifier {
            outcome: StubOutcome::Success(sample_classification()),
            calls: calls.clone(),
        };
        let mut session = Session::new(classifier, surface.clone());

        session.submit(None).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.state(), UiState::Idle);
        assert_eq!(
            surface.events(),
            vec![SurfaceEvent::Error("Please select an image first!".to_string())]
        );
    }

    #[tokio::test]
    async fn test_submit_success_runs_full_busy_cycle() {
        let surface = Arc::new(RecordingSurface::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = StubClassifier {
            outcome: StubOutcome::Success(sample_classification()),
            calls: calls.clone(),
        };
        let mut session = Session::new(classifier, surface.clone());
        let file = sample_file();

        session.submit(Some(&file)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.state(), UiState::Idle);
        assert_eq!(
            surface.events(),
            vec![
                SurfaceEvent::TriggerEnabled(false),
                SurfaceEvent::Busy(true),
                SurfaceEvent::Status(ANALYZING_MESSAGE.to_string()),
                SurfaceEvent::Busy(false),
                SurfaceEvent::TriggerEnabled(true),
                SurfaceEvent::Result(sample_classification()),
            ]
        );
    }

    #[tokio::test]
    async fn test_submit_failure_renders_error_and_recovers() {
        let surface = Arc::new(RecordingSurface::default());
        let classifier = StubClassifier {
            outcome: StubOutcome::ServerFailure("bad image".to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let mut session = Session::new(classifier, surface.clone());
        let file = sample_file();

        session.submit(Some(&file)).await;

        assert_eq!(session.state(), UiState::Idle);
        let events = surface.events();
        assert_eq!(
            events.last(),
            Some(&SurfaceEvent::Error("bad image".to_string()))
        );
        assert!(events.contains(&SurfaceEvent::Busy(false)));
        assert!(events.contains(&SurfaceEvent::TriggerEnabled(true)));
    }

    #[tokio::test]
    async fn test_submit_while_busy_is_noop() {
        let surface = Arc::new(RecordingSurface::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = StubClassifier {
            outcome: StubOutcome::Success(sample_classification()),
            calls: calls.clone(),
        };
        let mut session = Session::new(classifier, surface.clone());
        session.state = UiState::Busy;
        let file = sample_file();

        session.submit(Some(&file)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(surface.events().is_empty());
    }

    #[test]
    fn test_busy_guard_resets_state_on_unwind() {
        let surface = Arc::new(RecordingSurface::default());
        let mut state = UiState::Idle;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _busy = BusyGuard::enter(&mut state, surface.clone());
            panic!("unexpected fault mid-cycle");
        }));

        assert!(result.is_err());
        assert_eq!(state, UiState::Idle);
        let events = surface.events();
        assert_eq!(events.last(), Some(&SurfaceEvent::TriggerEnabled(true)));
        assert!(events.contains(&SurfaceEvent::Busy(false)));
    }
}

use crate::config::BackendConfig;
use crate::labels;
use crate::selection::SelectedFile;
use async_trait::async_trait;
use reqwest::{multipart, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

/// Terminal failure taxonomy for one submission. Display of the server and
/// application variants is exactly the message shown to the user.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Please select an image first!")]
    NoFileSelected,
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Server(String),
    #[error("{0}")]
    Application(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub tip: String,
    pub confidence: Option<f64>,
}

/// Superset of the response shapes observed from the backend: an integer
/// `prediction` index with `confidence`, or a pre-resolved
/// `skin_tone`/`label` string; failures carry `error` or `message`.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    success: Option<bool>,
    prediction: Option<i64>,
    confidence: Option<f64>,
    skin_tone: Option<String>,
    label: Option<String>,
    error: Option<String>,
    message: Option<String>,
}

impl PredictResponse {
    fn failure_message(&self, fallback: &str) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[async_trait]
pub trait Classifier: Send + Sync + 'static {
    async fn classify(&self, file: &SelectedFile) -> Result<Classification, PredictionError>;
}

pub struct HttpClassifier {
    client: reqwest::Client,
    predict_url: String,
}

impl HttpClassifier {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            predict_url: config.predict_url(),
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    async fn classify(&self, file: &SelectedFile) -> Result<Classification, PredictionError> {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(file.mime_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        interpret_response(status, &body)
    }
}

/// Classifies a completed HTTP exchange, in order: failing status, explicit
/// application-level failure, success. Transport failures never reach here.
pub(crate) fn interpret_response(
    status: StatusCode,
    body: &str,
) -> Result<Classification, PredictionError> {
    if !status.is_success() {
        let message = match serde_json::from_str::<PredictResponse>(body) {
            Ok(parsed) => parsed.failure_message("Request failed"),
            Err(_) => format!(
                "Server error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ),
        };
        return Err(PredictionError::Server(message));
    }

    let parsed: PredictResponse = serde_json::from_str(body)
        .map_err(|e| PredictionError::Application(format!("Invalid prediction response: {e}")))?;

    // Only an explicit refusal counts; the pre-resolved shape omits the flag.
    if parsed.success == Some(false) {
        return Err(PredictionError::Application(
            parsed.failure_message("Prediction failed"),
        ));
    }

    if let Some(class_id) = parsed.prediction {
        return Ok(Classification {
            label: labels::label_for(class_id).to_string(),
            tip: labels::tip_for(class_id).to_string(),
            confidence: parsed.confidence,
        });
    }

    if let Some(name) = parsed.skin_tone.or(parsed.label) {
        return Ok(Classification {
            label: name,
            tip: labels::GENERIC_TIP.to_string(),
            confidence: parsed.confidence,
        });
    }

    Err(PredictionError::Application(
        "Prediction missing from response".to_string(),
    ))
}

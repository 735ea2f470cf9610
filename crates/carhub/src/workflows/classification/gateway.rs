use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::response::{AnalysisOutcome, AnalysisPayload};
use crate::config::ClassifierConfig;

/// Trimmed, non-empty text accepted for classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRequest {
    text: String,
}

impl ClassificationRequest {
    /// `None` when nothing but whitespace was entered.
    pub fn new(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            None
        } else {
            Some(Self {
                text: text.to_string(),
            })
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Per-page credential the backend requires on state-changing requests. Opaque here.
#[derive(Clone, PartialEq, Eq)]
pub struct AntiForgeryToken(String);

impl AntiForgeryToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AntiForgeryToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AntiForgeryToken(..)")
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("classification request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classification service answered with status {status}")]
    Status { status: u16 },
    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    MalformedPayload(String),
}

/// Remote text classifier. Implementations decode the wire payload so callers only
/// ever see [`AnalysisOutcome`].
#[async_trait]
pub trait ClassifierGateway: Send + Sync {
    async fn analyze(
        &self,
        request: &ClassificationRequest,
        token: &AntiForgeryToken,
    ) -> Result<AnalysisOutcome, GatewayError>;
}

/// Posts the text as the `news_text` form field, the way the detector page does.
#[derive(Debug, Clone)]
pub struct HttpClassifierGateway {
    client: Client,
    endpoint: String,
}

impl HttpClassifierGateway {
    pub fn new(config: &ClassifierConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ClassifierGateway for HttpClassifierGateway {
    async fn analyze(
        &self,
        request: &ClassificationRequest,
        token: &AntiForgeryToken,
    ) -> Result<AnalysisOutcome, GatewayError> {
        let form = multipart::Form::new().text("news_text", request.text().to_string());
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-CSRFToken", token.as_str())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "classification response received");

        let payload = match serde_json::from_slice::<AnalysisPayload>(&body) {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => {
                return Err(GatewayError::Status {
                    status: status.as_u16(),
                })
            }
            Err(err) => return Err(GatewayError::Decode(err)),
        };

        match payload.into_outcome()? {
            AnalysisOutcome::Verdict(_) if !status.is_success() => {
                warn!(status = status.as_u16(), "success payload on error status");
                Err(GatewayError::Status {
                    status: status.as_u16(),
                })
            }
            outcome => Ok(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_text_is_trimmed() {
        let request = ClassificationRequest::new("  Breaking: petrol prices fall  ").expect("text");
        assert_eq!(request.text(), "Breaking: petrol prices fall");
        assert!(ClassificationRequest::new(" \n\t ").is_none());
        assert!(ClassificationRequest::new("").is_none());
    }

    #[test]
    fn token_debug_output_is_redacted() {
        let token = AntiForgeryToken::new("s3cr3t");
        assert!(!format!("{token:?}").contains("s3cr3t"));
    }
}

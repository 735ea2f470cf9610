use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::gateway::GatewayError;

pub const GENERIC_ANALYSIS_ERROR: &str = "An error occurred during analysis";

/// Wire shape returned by the classification endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisPayload {
    pub success: bool,
    #[serde(default)]
    pub prediction: Option<String>,
    #[serde(default)]
    pub is_fake: Option<bool>,
    #[serde(default)]
    pub confidence: Option<Value>,
    #[serde(default)]
    pub fake_probability: Option<Value>,
    #[serde(default)]
    pub real_probability: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsLabel {
    Fake,
    Real,
}

impl NewsLabel {
    /// An explicit `is_fake` flag wins; otherwise the prediction text is searched for "fake".
    pub fn resolve(is_fake: Option<bool>, prediction: Option<&str>) -> Option<Self> {
        let fake = match (is_fake, prediction) {
            (Some(flag), _) => flag,
            (None, Some(text)) => text.to_lowercase().contains("fake"),
            (None, None) => return None,
        };
        Some(if fake { NewsLabel::Fake } else { NewsLabel::Real })
    }

    pub fn headline(self) -> &'static str {
        match self {
            NewsLabel::Fake => "FAKE NEWS",
            NewsLabel::Real => "REAL NEWS",
        }
    }
}

/// A complete, successful classification. Scores are kept as the service sent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationVerdict {
    pub label: NewsLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    pub confidence: String,
    pub fake_probability: String,
    pub real_probability: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Verdict(ClassificationVerdict),
    Failed { message: String },
}

impl AnalysisPayload {
    pub fn into_outcome(self) -> Result<AnalysisOutcome, GatewayError> {
        if !self.success {
            let message = self
                .error
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| GENERIC_ANALYSIS_ERROR.to_string());
            return Ok(AnalysisOutcome::Failed { message });
        }

        let label = NewsLabel::resolve(self.is_fake, self.prediction.as_deref()).ok_or_else(
            || GatewayError::MalformedPayload("neither `is_fake` nor `prediction` present".into()),
        )?;

        Ok(AnalysisOutcome::Verdict(ClassificationVerdict {
            label,
            prediction: self.prediction,
            confidence: verbatim("confidence", self.confidence)?,
            fake_probability: verbatim("fake_probability", self.fake_probability)?,
            real_probability: verbatim("real_probability", self.real_probability)?,
        }))
    }
}

fn verbatim(field: &'static str, value: Option<Value>) -> Result<String, GatewayError> {
    match value {
        Some(Value::String(text)) => Ok(text),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(other) => Err(GatewayError::MalformedPayload(format!(
            "`{field}` must be a string or number, got {other}"
        ))),
        None => Err(GatewayError::MalformedPayload(format!("`{field}` missing"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Result<AnalysisOutcome, GatewayError> {
        serde_json::from_value::<AnalysisPayload>(value)
            .expect("payload shape")
            .into_outcome()
    }

    #[test]
    fn explicit_flag_wins_over_prediction_text() {
        assert_eq!(
            NewsLabel::resolve(Some(false), Some("Fake News")),
            Some(NewsLabel::Real)
        );
        assert_eq!(
            NewsLabel::resolve(None, Some("Likely FAKE")),
            Some(NewsLabel::Fake)
        );
        assert_eq!(NewsLabel::resolve(None, Some("Real News")), Some(NewsLabel::Real));
        assert_eq!(NewsLabel::resolve(None, None), None);
    }

    #[test]
    fn verdict_keeps_scores_verbatim() {
        let outcome = decode(json!({
            "success": true,
            "is_fake": true,
            "confidence": "92%",
            "fake_probability": "92%",
            "real_probability": "8%"
        }))
        .expect("verdict");
        match outcome {
            AnalysisOutcome::Verdict(verdict) => {
                assert_eq!(verdict.label.headline(), "FAKE NEWS");
                assert_eq!(verdict.confidence, "92%");
                assert_eq!(verdict.fake_probability, "92%");
                assert_eq!(verdict.real_probability, "8%");
            }
            other => panic!("expected verdict, got {other:?}"),
        }
    }

    #[test]
    fn numeric_scores_render_as_json_text() {
        let outcome = decode(json!({
            "success": true,
            "prediction": "Real News",
            "is_fake": false,
            "confidence": 87.25,
            "fake_probability": 12.75,
            "real_probability": 87.25
        }))
        .expect("verdict");
        match outcome {
            AnalysisOutcome::Verdict(verdict) => {
                assert_eq!(verdict.label, NewsLabel::Real);
                assert_eq!(verdict.confidence, "87.25");
                assert_eq!(verdict.fake_probability, "12.75");
            }
            other => panic!("expected verdict, got {other:?}"),
        }
    }

    #[test]
    fn failure_uses_server_message_or_generic_text() {
        assert_eq!(
            decode(json!({ "success": false, "error": "model unavailable" })).expect("failure"),
            AnalysisOutcome::Failed {
                message: "model unavailable".to_string()
            }
        );
        assert_eq!(
            decode(json!({ "success": false })).expect("failure"),
            AnalysisOutcome::Failed {
                message: GENERIC_ANALYSIS_ERROR.to_string()
            }
        );
    }

    #[test]
    fn partial_success_payloads_are_malformed() {
        let err = decode(json!({
            "success": true,
            "is_fake": false,
            "confidence": "70%",
            "fake_probability": "30%"
        }))
        .expect_err("missing real probability");
        assert!(matches!(err, GatewayError::MalformedPayload(_)));

        let err = decode(json!({
            "success": true,
            "confidence": "70%",
            "fake_probability": "30%",
            "real_probability": "70%"
        }))
        .expect_err("no label");
        assert!(matches!(err, GatewayError::MalformedPayload(_)));
    }
}

//! Pure transition function for the classification workflow.
//!
//! `transition` never performs I/O. It returns the next state together with the
//! effects the adapter must carry out, in order.

use serde::Serialize;

use super::gateway::ClassificationRequest;
use super::response::{AnalysisOutcome, ClassificationVerdict};
use crate::notifications::Severity;

pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text to analyze";
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error: Could not connect to server. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClassificationState {
    Idle,
    Submitting { request: ClassificationRequest },
    Result { verdict: ClassificationVerdict },
    Error { message: String },
}

impl ClassificationState {
    pub fn label(&self) -> &'static str {
        match self {
            ClassificationState::Idle => "idle",
            ClassificationState::Submitting { .. } => "submitting",
            ClassificationState::Result { .. } => "result",
            ClassificationState::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationEvent {
    Submit { text: String },
    ResponseReceived(AnalysisOutcome),
    TransportFailed { detail: String },
    /// The user closed the result or error panel.
    Dismiss,
    /// The caller stopped waiting for the outstanding reply.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Result,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationEffect {
    HidePanels,
    Notify { message: String, severity: Severity },
    SendRequest(ClassificationRequest),
    ShowResult(ClassificationVerdict),
    ShowError(String),
    ScrollIntoView(Panel),
}

pub fn transition(
    state: ClassificationState,
    event: ClassificationEvent,
) -> (ClassificationState, Vec<ClassificationEffect>) {
    use ClassificationEffect as Effect;
    use ClassificationState as State;

    match (state, event) {
        (state @ State::Submitting { .. }, ClassificationEvent::Submit { .. }) => {
            (state, Vec::new())
        }
        (state, ClassificationEvent::Submit { text }) => {
            let mut effects = Vec::new();
            if !matches!(state, State::Idle) {
                effects.push(Effect::HidePanels);
            }
            match ClassificationRequest::new(&text) {
                Some(request) => {
                    effects.push(Effect::SendRequest(request.clone()));
                    (State::Submitting { request }, effects)
                }
                None => {
                    effects.push(Effect::Notify {
                        message: EMPTY_TEXT_MESSAGE.to_string(),
                        severity: Severity::Warning,
                    });
                    (State::Idle, effects)
                }
            }
        }
        (State::Submitting { .. }, ClassificationEvent::ResponseReceived(outcome)) => match outcome {
            AnalysisOutcome::Verdict(verdict) => (
                State::Result {
                    verdict: verdict.clone(),
                },
                vec![
                    Effect::ShowResult(verdict),
                    Effect::ScrollIntoView(Panel::Result),
                ],
            ),
            AnalysisOutcome::Failed { message } => failed(message),
        },
        (State::Submitting { .. }, ClassificationEvent::TransportFailed { .. }) => {
            failed(NETWORK_ERROR_MESSAGE.to_string())
        }
        (State::Result { .. } | State::Error { .. }, ClassificationEvent::Dismiss) => {
            (State::Idle, vec![Effect::HidePanels])
        }
        (state, ClassificationEvent::Dismiss) => (state, Vec::new()),
        (State::Submitting { .. }, ClassificationEvent::Abandoned) => (State::Idle, Vec::new()),
        // A reply with nothing outstanding has no request to belong to.
        (state, ClassificationEvent::ResponseReceived(_))
        | (state, ClassificationEvent::TransportFailed { .. })
        | (state, ClassificationEvent::Abandoned) => (state, Vec::new()),
    }
}

fn failed(message: String) -> (ClassificationState, Vec<ClassificationEffect>) {
    (
        ClassificationState::Error {
            message: message.clone(),
        },
        vec![
            ClassificationEffect::ShowError(message),
            ClassificationEffect::ScrollIntoView(Panel::Error),
        ],
    )
}

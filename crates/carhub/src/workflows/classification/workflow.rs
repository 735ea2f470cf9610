use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::gateway::{AntiForgeryToken, ClassificationRequest, ClassifierGateway};
use super::machine::{
    transition, ClassificationEffect, ClassificationEvent, ClassificationState, Panel,
};
use super::response::{ClassificationVerdict, NewsLabel};
use crate::notifications::{NotificationSurface, Severity};

/// Rendered result card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPanel {
    pub headline: &'static str,
    pub tone: Severity,
    pub confidence: String,
    pub fake_probability: String,
    pub real_probability: String,
}

impl From<&ClassificationVerdict> for ResultPanel {
    fn from(verdict: &ClassificationVerdict) -> Self {
        let tone = match verdict.label {
            NewsLabel::Fake => Severity::Danger,
            NewsLabel::Real => Severity::Success,
        };
        Self {
            headline: verdict.label.headline(),
            tone,
            confidence: verdict.confidence.clone(),
            fake_probability: verdict.fake_probability.clone(),
            real_probability: verdict.real_probability.clone(),
        }
    }
}

/// What the detector page currently shows below the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub result: Option<ResultPanel>,
    pub error: Option<String>,
    pub scrolled_to: Option<Panel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request was already outstanding; nothing was sent.
    Ignored,
    /// The input failed validation locally; nothing was sent.
    Invalid,
    Result(ClassificationVerdict),
    Error(String),
}

/// Executes the effects produced by [`transition`] against the gateway, the
/// notification surface, and the panel view.
pub struct ClassificationWorkflow<G> {
    gateway: Arc<G>,
    surface: NotificationSurface,
    token: AntiForgeryToken,
    state: Mutex<ClassificationState>,
    panels: Mutex<PanelView>,
}

impl<G> ClassificationWorkflow<G>
where
    G: ClassifierGateway,
{
    pub fn new(gateway: Arc<G>, surface: NotificationSurface, token: AntiForgeryToken) -> Self {
        Self {
            gateway,
            surface,
            token,
            state: Mutex::new(ClassificationState::Idle),
            panels: Mutex::new(PanelView::default()),
        }
    }

    pub fn state(&self) -> ClassificationState {
        lock(&self.state).clone()
    }

    pub fn panels(&self) -> PanelView {
        lock(&self.panels).clone()
    }

    /// Handle a click on the analyze button.
    ///
    /// Takes `&self` so a second click can arrive while the first request is
    /// awaiting its reply; that click is ignored rather than issuing another call.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let (mut settled, effects) = self.dispatch(ClassificationEvent::Submit {
            text: text.to_string(),
        });
        let mut queue: VecDeque<ClassificationEffect> = effects.into();

        if queue.is_empty() {
            debug!("submission ignored while a request is outstanding");
            return SubmitOutcome::Ignored;
        }

        while let Some(effect) = queue.pop_front() {
            match effect {
                ClassificationEffect::SendRequest(request) => {
                    let in_flight = InFlight::new(self);
                    let event = self.call_gateway(&request).await;
                    in_flight.settle();
                    let (state, effects) = self.dispatch(event);
                    settled = state;
                    queue.extend(effects);
                }
                other => self.render(other),
            }
        }

        match settled {
            ClassificationState::Result { verdict } => SubmitOutcome::Result(verdict),
            ClassificationState::Error { message } => SubmitOutcome::Error(message),
            ClassificationState::Idle | ClassificationState::Submitting { .. } => {
                SubmitOutcome::Invalid
            }
        }
    }

    /// Close the visible result or error panel. Has no effect while a request is outstanding.
    pub fn dismiss(&self) {
        let (_, effects) = self.dispatch(ClassificationEvent::Dismiss);
        for effect in effects {
            self.render(effect);
        }
    }

    /// Applies `event` and returns the state it settled on along with the effects to run.
    fn dispatch(
        &self,
        event: ClassificationEvent,
    ) -> (ClassificationState, Vec<ClassificationEffect>) {
        let mut state = lock(&self.state);
        let current = std::mem::replace(&mut *state, ClassificationState::Idle);
        let from = current.label();
        let (next, effects) = transition(current, event);
        debug!(from, to = next.label(), effects = effects.len(), "classification transition");
        *state = next.clone();
        (next, effects)
    }

    async fn call_gateway(&self, request: &ClassificationRequest) -> ClassificationEvent {
        let reply = self
            .surface
            .with_busy_indicator(self.gateway.analyze(request, &self.token))
            .await;

        match reply {
            Ok(outcome) => {
                info!(chars = request.text().chars().count(), "classification reply received");
                ClassificationEvent::ResponseReceived(outcome)
            }
            Err(err) => {
                error!(error = %err, "classification call failed");
                ClassificationEvent::TransportFailed {
                    detail: err.to_string(),
                }
            }
        }
    }

    fn render(&self, effect: ClassificationEffect) {
        let mut panels = lock(&self.panels);
        match effect {
            ClassificationEffect::HidePanels => *panels = PanelView::default(),
            ClassificationEffect::Notify { message, severity } => {
                warn!(%message, "classification input rejected");
                self.surface.notify(message, severity);
            }
            ClassificationEffect::ShowResult(verdict) => {
                info!(label = verdict.label.headline(), "classification result shown");
                panels.result = Some(ResultPanel::from(&verdict));
            }
            ClassificationEffect::ShowError(message) => {
                warn!(%message, "classification error shown");
                panels.error = Some(message);
            }
            ClassificationEffect::ScrollIntoView(panel) => panels.scrolled_to = Some(panel),
            ClassificationEffect::SendRequest(_) => {}
        }
    }
}

/// Marks a gateway call as outstanding. If the submitting future is dropped before the
/// reply arrives, the workflow is returned to `Idle` so the next submit is accepted.
struct InFlight<'a, G>
where
    G: ClassifierGateway,
{
    workflow: &'a ClassificationWorkflow<G>,
    armed: bool,
}

impl<'a, G> InFlight<'a, G>
where
    G: ClassifierGateway,
{
    fn new(workflow: &'a ClassificationWorkflow<G>) -> Self {
        Self {
            workflow,
            armed: true,
        }
    }

    fn settle(mut self) {
        self.armed = false;
    }
}

impl<G> Drop for InFlight<'_, G>
where
    G: ClassifierGateway,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("classification request abandoned before its reply");
        let (_, effects) = self.workflow.dispatch(ClassificationEvent::Abandoned);
        for effect in effects {
            self.workflow.render(effect);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

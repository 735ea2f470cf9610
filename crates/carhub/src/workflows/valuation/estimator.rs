use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::pricing::{estimate, Brand, Condition, ValuationInput, ValuationResult};
use super::pricing::{MIN_MODEL_YEAR, REFERENCE_YEAR};
use crate::notifications::{NotificationSurface, Severity};

pub const VALUATION_SUCCESS_MESSAGE: &str = "Valuation calculated successfully!";

/// Raw values of the valuation modal, as typed or selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationDraft {
    pub brand: Option<String>,
    pub model_year: Option<String>,
    pub mileage_km: Option<String>,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ValuationRejection {
    #[error("Please fill all fields")]
    MissingField { field: &'static str },
    #[error("Model year must be between 2000 and 2025")]
    ModelYearOutOfRange { year: i64 },
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

impl ValuationDraft {
    /// Checks every field is present and usable. Fields are checked in form order.
    pub fn validate(&self) -> Result<ValuationInput, ValuationRejection> {
        let brand =
            filled(&self.brand).ok_or(ValuationRejection::MissingField { field: "brand" })?;
        let year = filled(&self.model_year)
            .and_then(|raw| raw.parse::<i64>().ok())
            .ok_or(ValuationRejection::MissingField {
                field: "model_year",
            })?;
        let mileage_km = filled(&self.mileage_km)
            .and_then(|raw| raw.parse::<u32>().ok())
            .ok_or(ValuationRejection::MissingField {
                field: "mileage_km",
            })?;
        let condition = filled(&self.condition)
            .and_then(Condition::parse)
            .ok_or(ValuationRejection::MissingField { field: "condition" })?;

        if !(i64::from(MIN_MODEL_YEAR)..=i64::from(REFERENCE_YEAR)).contains(&year) {
            return Err(ValuationRejection::ModelYearOutOfRange { year });
        }

        Ok(ValuationInput {
            brand: Brand::parse(brand),
            model_year: year as i32,
            mileage_km,
            condition,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ValuationPhase {
    CollectingInput,
    Rejected { reason: ValuationRejection },
    Computing { input: ValuationInput },
    Displaying { result: ValuationResult },
}

impl ValuationPhase {
    pub fn label(&self) -> &'static str {
        match self {
            ValuationPhase::CollectingInput => "collecting_input",
            ValuationPhase::Rejected { .. } => "rejected",
            ValuationPhase::Computing { .. } => "computing",
            ValuationPhase::Displaying { .. } => "displaying",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuationEvent {
    Calculate(ValuationDraft),
    DelayElapsed,
    Acknowledge,
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuationEffect {
    Notify { message: String, severity: Severity },
    /// Hold the busy indicator for the minimum visible delay, then report `DelayElapsed`.
    BeginComputing,
    ShowResult(ValuationResult),
}

/// Pure transition for the valuation modal.
pub fn transition(
    phase: ValuationPhase,
    event: ValuationEvent,
) -> (ValuationPhase, Vec<ValuationEffect>) {
    match (phase, event) {
        // A phase still `Computing` here belongs to an abandoned calculation.
        (
            ValuationPhase::CollectingInput
            | ValuationPhase::Displaying { .. }
            | ValuationPhase::Computing { .. },
            ValuationEvent::Calculate(draft),
        ) => match draft.validate() {
            Ok(input) => (
                ValuationPhase::Computing { input },
                vec![ValuationEffect::BeginComputing],
            ),
            Err(reason) => {
                let message = reason.to_string();
                (
                    ValuationPhase::Rejected { reason },
                    vec![ValuationEffect::Notify {
                        message,
                        severity: Severity::Warning,
                    }],
                )
            }
        },
        (ValuationPhase::Computing { input }, ValuationEvent::DelayElapsed) => {
            let result = estimate(&input);
            (
                ValuationPhase::Displaying { result },
                vec![
                    ValuationEffect::ShowResult(result),
                    ValuationEffect::Notify {
                        message: VALUATION_SUCCESS_MESSAGE.to_string(),
                        severity: Severity::Success,
                    },
                ],
            )
        }
        (ValuationPhase::Rejected { .. }, ValuationEvent::Acknowledge)
        | (ValuationPhase::Displaying { .. }, ValuationEvent::Dismiss) => {
            (ValuationPhase::CollectingInput, Vec::new())
        }
        (phase, _) => (phase, Vec::new()),
    }
}

/// The valuation modal: owns the draft and drives [`transition`].
#[derive(Debug)]
pub struct ValuationEstimator {
    surface: NotificationSurface,
    minimum_delay: Duration,
    draft: ValuationDraft,
    phase: ValuationPhase,
}

impl ValuationEstimator {
    pub fn new(surface: NotificationSurface, minimum_delay: Duration) -> Self {
        Self {
            surface,
            minimum_delay,
            draft: ValuationDraft::default(),
            phase: ValuationPhase::CollectingInput,
        }
    }

    pub fn phase(&self) -> &ValuationPhase {
        &self.phase
    }

    pub fn draft(&self) -> &ValuationDraft {
        &self.draft
    }

    /// Fields are edited in place; a rejected calculation keeps them.
    pub fn draft_mut(&mut self) -> &mut ValuationDraft {
        &mut self.draft
    }

    /// Calculate button. Rejections leave the modal collecting input again.
    pub async fn calculate(&mut self) -> Result<ValuationResult, ValuationRejection> {
        let mut pending = self.dispatch(ValuationEvent::Calculate(self.draft.clone()));

        while !pending.is_empty() {
            let mut next = Vec::new();
            for effect in pending {
                match effect {
                    ValuationEffect::BeginComputing => {
                        self.surface
                            .with_busy_indicator(tokio::time::sleep(self.minimum_delay))
                            .await;
                        next.extend(self.dispatch(ValuationEvent::DelayElapsed));
                    }
                    other => self.apply(other),
                }
            }
            pending = next;
        }

        match &self.phase {
            ValuationPhase::Displaying { result } => Ok(*result),
            ValuationPhase::Rejected { reason } => {
                let reason = reason.clone();
                self.dispatch(ValuationEvent::Acknowledge);
                Err(reason)
            }
            unsettled => {
                warn!(phase = unsettled.label(), "valuation did not settle; re-validating draft");
                self.phase = ValuationPhase::CollectingInput;
                self.draft.validate().map(|input| estimate(&input))
            }
        }
    }

    /// Close the result, keeping the draft for another estimate.
    pub fn dismiss(&mut self) {
        self.dispatch(ValuationEvent::Dismiss);
    }

    fn dispatch(&mut self, event: ValuationEvent) -> Vec<ValuationEffect> {
        let current = std::mem::replace(&mut self.phase, ValuationPhase::CollectingInput);
        let from = current.label();
        let (next, effects) = transition(current, event);
        debug!(from, to = next.label(), "valuation transition");
        self.phase = next;
        effects
    }

    fn apply(&self, effect: ValuationEffect) {
        match effect {
            ValuationEffect::Notify { message, severity } => {
                if severity == Severity::Warning {
                    warn!(%message, "valuation rejected");
                }
                self.surface.notify(message, severity);
            }
            ValuationEffect::ShowResult(result) => {
                info!(price = result.estimated_price, "valuation displayed");
            }
            ValuationEffect::BeginComputing => {}
        }
    }
}

//! Car valuation modal: collect inputs, validate, compute, display.

mod estimator;
mod pricing;

pub use estimator::{
    transition, ValuationDraft, ValuationEffect, ValuationEstimator, ValuationEvent,
    ValuationPhase, ValuationRejection, VALUATION_SUCCESS_MESSAGE,
};
pub use pricing::{
    estimate, Brand, Condition, ValuationInput, ValuationResult, CURRENCY, PRICE_FLOOR,
    REFERENCE_YEAR,
};

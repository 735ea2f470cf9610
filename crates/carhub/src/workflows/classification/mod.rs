//! Text classification round trip: validate, submit once, render the verdict or the error.

mod gateway;
mod machine;
mod response;
mod workflow;

pub use gateway::{
    AntiForgeryToken, ClassificationRequest, ClassifierGateway, GatewayError,
    HttpClassifierGateway,
};
pub use machine::{
    transition, ClassificationEffect, ClassificationEvent, ClassificationState, Panel,
    EMPTY_TEXT_MESSAGE, NETWORK_ERROR_MESSAGE,
};
pub use response::{
    AnalysisOutcome, AnalysisPayload, ClassificationVerdict, NewsLabel, GENERIC_ANALYSIS_ERROR,
};
pub use workflow::{ClassificationWorkflow, PanelView, ResultPanel, SubmitOutcome};

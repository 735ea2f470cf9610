pub mod feedback;
pub mod guards;
pub mod validation;

pub use feedback::{field_feedback, FieldFeedback, FieldState};
pub use guards::{
    request_password_reset, FieldCheck, FieldRule, FormFields, FormGuard, FormKind,
    GuardRejection, SearchFilter, SubmissionPermit, SEARCH_FILTERS,
};
pub use validation::{
    is_valid_email, is_valid_message_length, is_valid_name_length, is_valid_password,
    is_valid_phone, ValidationResult, ValidationRule,
};

use serde::Serialize;

use super::guards::FormFields;
use super::validation::{is_valid_email, is_valid_phone, MIN_MESSAGE_LENGTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFeedback {
    pub state: FieldState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl FieldFeedback {
    fn marked(valid: bool) -> Self {
        Self {
            state: if valid {
                FieldState::Valid
            } else {
                FieldState::Invalid
            },
            hint: None,
        }
    }
}

/// Inline feedback shown while the user edits `field`; `None` leaves the input unmarked.
pub fn field_feedback(field: &str, fields: &FormFields) -> Option<FieldFeedback> {
    let value = fields.get(field)?;
    match field {
        "email" if !value.is_empty() => Some(FieldFeedback::marked(is_valid_email(value))),
        "phone" if !value.is_empty() => Some(FieldFeedback::marked(is_valid_phone(value))),
        "password2" if !value.is_empty() => {
            let original = fields.get("password1")?;
            Some(FieldFeedback::marked(value == original))
        }
        "message" => {
            let length = value.chars().count();
            Some(FieldFeedback {
                hint: Some(format!("{length} characters")),
                ..FieldFeedback::marked(length >= MIN_MESSAGE_LENGTH)
            })
        }
        _ => None,
    }
}

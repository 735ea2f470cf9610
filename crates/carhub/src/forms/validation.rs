//! Stateless predicates shared by every form on the site.
//!
//! Each predicate is total over its input: malformed text yields `false`,
//! never a panic or an error.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_MESSAGE_LENGTH: usize = 10;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MIN_PHONE_DIGITS: usize = 10;

struct FieldPatterns {
    email: Regex,
    phone: Regex,
}

static PATTERNS: OnceLock<FieldPatterns> = OnceLock::new();

fn patterns() -> &'static FieldPatterns {
    PATTERNS.get_or_init(|| FieldPatterns {
        email: Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile"),
        phone: Regex::new(r"^[0-9\s+\-()]+$").expect("phone regex must compile"),
    })
}

pub fn is_valid_email(value: &str) -> bool {
    patterns().email.is_match(&value.to_lowercase())
}

pub fn is_valid_phone(value: &str) -> bool {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    patterns().phone.is_match(value) && digits >= MIN_PHONE_DIGITS
}

pub fn is_valid_password(value: &str) -> bool {
    value.chars().count() >= MIN_PASSWORD_LENGTH
}

pub fn is_valid_message_length(value: &str) -> bool {
    value.chars().count() >= MIN_MESSAGE_LENGTH
}

pub fn is_valid_name_length(value: &str) -> bool {
    value.chars().count() >= MIN_NAME_LENGTH
}

/// Outcome of a single predicate, carrying a reason when it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Named predicate, so callers can pick a rule from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    Email,
    Phone,
    Password,
    MessageLength,
    NameLength,
}

impl ValidationRule {
    pub fn check(self, value: &str) -> ValidationResult {
        let (valid, reason) = match self {
            ValidationRule::Email => (is_valid_email(value), "not a valid email address"),
            ValidationRule::Phone => (
                is_valid_phone(value),
                "phone numbers need at least 10 digits and only digits, spaces, +, - or ()",
            ),
            ValidationRule::Password => (
                is_valid_password(value),
                "password must be at least 8 characters",
            ),
            ValidationRule::MessageLength => (
                is_valid_message_length(value),
                "message must be at least 10 characters",
            ),
            ValidationRule::NameLength => (
                is_valid_name_length(value),
                "name must be at least 2 characters",
            ),
        };

        if valid {
            ValidationResult::ok()
        } else {
            ValidationResult::rejected(reason)
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ValidationRule::Email => "email",
            ValidationRule::Phone => "phone",
            ValidationRule::Password => "password",
            ValidationRule::MessageLength => "message",
            ValidationRule::NameLength => "name",
        }
    }
}

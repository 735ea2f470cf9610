use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::validation::{
    is_valid_email, is_valid_message_length, is_valid_name_length, is_valid_password,
};
use crate::notifications::{BusyGuard, NotificationSurface, Severity};

/// Named input values of a submitted form. Fields the page does not render are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Contact,
    Login,
    Signup,
    Search,
}

impl FormKind {
    pub fn label(self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::Login => "login",
            FormKind::Signup => "signup",
            FormKind::Search => "search",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCheck {
    NameLength,
    Email,
    MessageLength,
    NonEmpty,
    Password,
    /// Value must equal the named sibling field.
    Matches(&'static str),
    /// At least one of the listed selects must hold something other than its placeholder.
    AnySelected(&'static [SearchFilter]),
}

/// A search select and the placeholder option it shows when nothing is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFilter {
    pub field: &'static str,
    pub placeholder: &'static str,
}

pub const SEARCH_FILTERS: &[SearchFilter] = &[
    SearchFilter {
        field: "brand",
        placeholder: "Select Brand",
    },
    SearchFilter {
        field: "year",
        placeholder: "Select Model Year",
    },
    SearchFilter {
        field: "price_range",
        placeholder: "Price Range",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub check: FieldCheck,
    pub trim: bool,
    pub message: &'static str,
}

impl FieldRule {
    const fn new(field: &'static str, check: FieldCheck, trim: bool, message: &'static str) -> Self {
        Self {
            field,
            check,
            trim,
            message,
        }
    }

    /// `None` when the field (or the sibling it is compared against) is absent.
    fn passes(&self, fields: &FormFields) -> Option<bool> {
        if let FieldCheck::AnySelected(filters) = self.check {
            return any_selected(filters, fields);
        }
        let raw = fields.get(self.field)?;
        let value = if self.trim { raw.trim() } else { raw };
        let passed = match self.check {
            FieldCheck::NameLength => is_valid_name_length(value),
            FieldCheck::Email => is_valid_email(value),
            FieldCheck::MessageLength => is_valid_message_length(value),
            FieldCheck::NonEmpty => !value.is_empty(),
            FieldCheck::Password => is_valid_password(value),
            FieldCheck::Matches(other) => value == fields.get(other)?,
            FieldCheck::AnySelected(_) => true,
        };
        Some(passed)
    }
}

/// Absent selects are ignored; `None` when the page renders none of them.
fn any_selected(filters: &[SearchFilter], fields: &FormFields) -> Option<bool> {
    let mut rendered = filters
        .iter()
        .filter_map(|filter| fields.get(filter.field).map(|value| (filter, value.trim())))
        .peekable();
    rendered.peek()?;
    Some(rendered.any(|(filter, value)| !value.is_empty() && value != filter.placeholder))
}

const CONTACT_RULES: &[FieldRule] = &[
    FieldRule::new(
        "first_name",
        FieldCheck::NameLength,
        true,
        "Please enter a valid first name",
    ),
    FieldRule::new(
        "last_name",
        FieldCheck::NameLength,
        true,
        "Please enter a valid last name",
    ),
    FieldRule::new(
        "email",
        FieldCheck::Email,
        true,
        "Please enter a valid email address",
    ),
    FieldRule::new(
        "message",
        FieldCheck::MessageLength,
        true,
        "Message must be at least 10 characters",
    ),
];

const LOGIN_RULES: &[FieldRule] = &[
    FieldRule::new(
        "email",
        FieldCheck::Email,
        false,
        "Please enter a valid email address",
    ),
    FieldRule::new(
        "password",
        FieldCheck::NonEmpty,
        false,
        "Please enter your password",
    ),
];

const SIGNUP_RULES: &[FieldRule] = &[
    FieldRule::new(
        "password2",
        FieldCheck::Matches("password1"),
        false,
        "Passwords do not match",
    ),
    FieldRule::new(
        "password1",
        FieldCheck::Password,
        false,
        "Password must be at least 8 characters",
    ),
];

const SEARCH_RULES: &[FieldRule] = &[FieldRule::new(
    "brand",
    FieldCheck::AnySelected(SEARCH_FILTERS),
    true,
    "Please select at least one search filter!",
)];

/// The first rule that failed; submission is cancelled and this message shown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GuardRejection {
    pub form: FormKind,
    pub field: &'static str,
    pub message: &'static str,
}

/// Proof that a form passed its guard. Holds the busy indicator until the page
/// navigates away, which is modelled by dropping the permit.
#[derive(Debug)]
pub struct SubmissionPermit {
    pub form: FormKind,
    busy: BusyGuard,
}

impl SubmissionPermit {
    pub fn holds_busy_indicator(&self) -> bool {
        self.busy.is_owner()
    }
}

/// Ordered validation gate in front of a form's native submission.
#[derive(Debug, Clone, Copy)]
pub struct FormGuard {
    form: FormKind,
    rules: &'static [FieldRule],
}

impl FormGuard {
    pub fn for_form(form: FormKind) -> Self {
        let rules = match form {
            FormKind::Contact => CONTACT_RULES,
            FormKind::Login => LOGIN_RULES,
            FormKind::Signup => SIGNUP_RULES,
            FormKind::Search => SEARCH_RULES,
        };
        Self { form, rules }
    }

    pub fn contact() -> Self {
        Self::for_form(FormKind::Contact)
    }

    pub fn login() -> Self {
        Self::for_form(FormKind::Login)
    }

    pub fn signup() -> Self {
        Self::for_form(FormKind::Signup)
    }

    pub fn search() -> Self {
        Self::for_form(FormKind::Search)
    }

    pub fn form(&self) -> FormKind {
        self.form
    }

    pub fn rules(&self) -> &'static [FieldRule] {
        self.rules
    }

    /// Evaluate rules in declared order, stopping at the first failure.
    pub fn evaluate(&self, fields: &FormFields) -> Result<(), GuardRejection> {
        for rule in self.rules {
            match rule.passes(fields) {
                Some(true) => {}
                Some(false) => {
                    return Err(GuardRejection {
                        form: self.form,
                        field: rule.field,
                        message: rule.message,
                    })
                }
                None => debug!(
                    form = self.form.label(),
                    field = rule.field,
                    "field absent, rule skipped"
                ),
            }
        }
        Ok(())
    }

    /// Gate a submission: one danger notification on failure, otherwise a permit that
    /// keeps the busy indicator up while the native submission proceeds.
    pub fn submit(
        &self,
        fields: &FormFields,
        surface: &NotificationSurface,
    ) -> Result<SubmissionPermit, GuardRejection> {
        match self.evaluate(fields) {
            Ok(()) => {
                info!(form = self.form.label(), "form submission allowed");
                Ok(SubmissionPermit {
                    form: self.form,
                    busy: surface.acquire_busy(),
                })
            }
            Err(rejection) => {
                warn!(
                    form = self.form.label(),
                    field = rejection.field,
                    "form submission blocked"
                );
                surface.notify(rejection.message, Severity::Danger);
                Err(rejection)
            }
        }
    }
}

/// Forgot-password flow from the login page. The reset request itself is simulated.
pub async fn request_password_reset(
    surface: &NotificationSurface,
    email: &str,
    delay: Duration,
) -> Result<(), GuardRejection> {
    if !is_valid_email(email) {
        surface.notify("Please enter a valid email address", Severity::Danger);
        return Err(GuardRejection {
            form: FormKind::Login,
            field: "email",
            message: "Please enter a valid email address",
        });
    }

    surface
        .with_busy_indicator(tokio::time::sleep(delay))
        .await;
    surface.notify("Password reset link sent to your email!", Severity::Success);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> NotificationSurface {
        NotificationSurface::new(Duration::from_secs(3))
    }

    fn contact_fields() -> FormFields {
        FormFields::new()
            .with("first_name", "Ayesha")
            .with("last_name", "Khan")
            .with("email", "ayesha@example.pk")
            .with("message", "Is the Corolla still available?")
    }

    #[test]
    fn contact_guard_stops_at_first_failure() {
        let fields = contact_fields()
            .with("first_name", " A ")
            .with("email", "not-an-email");
        let rejection = FormGuard::contact()
            .evaluate(&fields)
            .expect_err("short first name");
        assert_eq!(rejection.field, "first_name");
        assert_eq!(rejection.message, "Please enter a valid first name");
    }

    #[test]
    fn contact_guard_trims_before_measuring() {
        let fields = contact_fields().with("message", "   too short   ");
        let rejection = FormGuard::contact().evaluate(&fields).expect_err("message");
        assert_eq!(rejection.message, "Message must be at least 10 characters");
    }

    #[test]
    fn search_requires_at_least_one_filter() {
        let surface = surface();
        let untouched = FormFields::new()
            .with("brand", "Select Brand")
            .with("year", "Select Model Year")
            .with("price_range", "Price Range");
        let rejection = FormGuard::search()
            .submit(&untouched, &surface)
            .expect_err("no filter chosen");
        assert_eq!(rejection.message, "Please select at least one search filter!");
        assert_eq!(surface.history().len(), 1);

        let by_year = untouched.with("year", "2021");
        let permit = FormGuard::search()
            .submit(&by_year, &surface)
            .expect("one filter chosen");
        assert!(permit.holds_busy_indicator());
    }

    #[test]
    fn search_guard_skips_pages_without_filters() {
        assert!(FormGuard::search().evaluate(&FormFields::new()).is_ok());
    }

    #[test]
    fn blocked_submission_emits_exactly_one_notification() {
        let surface = surface();
        let fields = contact_fields()
            .with("last_name", "")
            .with("email", "bad")
            .with("message", "");
        let result = FormGuard::contact().submit(&fields, &surface);
        assert!(result.is_err());
        let history = surface.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "Please enter a valid last name");
        assert_eq!(history[0].severity, Severity::Danger);
        assert!(!surface.is_busy());
    }

    #[test]
    fn allowed_submission_keeps_busy_until_navigation() {
        let surface = surface();
        let permit = FormGuard::contact()
            .submit(&contact_fields(), &surface)
            .expect("valid contact form");
        assert!(permit.holds_busy_indicator());
        assert!(surface.is_busy());
        assert!(surface.history().is_empty());
        drop(permit);
        assert!(!surface.is_busy());
    }

    #[test]
    fn absent_fields_are_skipped() {
        let fields = FormFields::new().with("email", "driver@example.com");
        assert!(FormGuard::login().evaluate(&fields).is_ok());
        assert!(FormGuard::signup().evaluate(&FormFields::new()).is_ok());
    }

    #[test]
    fn login_guard_checks_email_then_password() {
        let fields = FormFields::new()
            .with("email", "driver@example.com")
            .with("password", "");
        let rejection = FormGuard::login().evaluate(&fields).expect_err("empty password");
        assert_eq!(rejection.message, "Please enter your password");

        let fields = fields.with("email", " driver@example.com");
        let rejection = FormGuard::login().evaluate(&fields).expect_err("untrimmed email");
        assert_eq!(rejection.field, "email");
    }

    #[test]
    fn signup_guard_checks_match_before_length() {
        let fields = FormFields::new()
            .with("password1", "short")
            .with("password2", "shorter");
        let rejection = FormGuard::signup().evaluate(&fields).expect_err("mismatch");
        assert_eq!(rejection.message, "Passwords do not match");

        let fields = fields.with("password2", "short");
        let rejection = FormGuard::signup().evaluate(&fields).expect_err("too short");
        assert_eq!(rejection.message, "Password must be at least 8 characters");

        let fields =
            FormFields::from_iter([("password1", "longenough1"), ("password2", "longenough1")]);
        assert!(FormGuard::signup().evaluate(&fields).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn password_reset_rejects_invalid_email_without_busy() {
        let surface = surface();
        let result =
            request_password_reset(&surface, "nobody", Duration::from_millis(1_500)).await;
        assert!(result.is_err());
        let history = surface.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].severity, Severity::Danger);
    }

    #[tokio::test(start_paused = true)]
    async fn password_reset_confirms_after_delay() {
        let surface = surface();
        request_password_reset(&surface, "driver@example.com", Duration::from_millis(1_500))
            .await
            .expect("valid email");
        assert!(!surface.is_busy());
        let history = surface.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "Password reset link sent to your email!");
        assert_eq!(history[0].severity, Severity::Success);
    }
}

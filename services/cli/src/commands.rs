use crate::infra::{parse_field, render_panels};
use carhub::config::{normalize_base_url, AppConfig, ConfigError};
use carhub::error::AppError;
use carhub::forms::{field_feedback, FormFields, FormGuard, FormKind, ValidationRule};
use carhub::notifications::NotificationSurface;
use carhub::workflows::classification::{
    AntiForgeryToken, ClassificationWorkflow, HttpClassifierGateway, SubmitOutcome,
};
use carhub::workflows::valuation::{ValuationDraft, ValuationEstimator};
use clap::{Args, ValueEnum};
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ValueArgs {
    /// Car brand (toyota, honda, suzuki, bmw, mercedes, or any other make)
    #[arg(long)]
    pub(crate) brand: Option<String>,
    /// Model year between 2000 and 2025
    #[arg(long)]
    pub(crate) year: Option<String>,
    /// Odometer reading in kilometres
    #[arg(long)]
    pub(crate) mileage: Option<String>,
    /// excellent, good, fair, or poor
    #[arg(long)]
    pub(crate) condition: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// News text to analyze
    #[arg(long)]
    pub(crate) text: String,
    /// Override the configured origin of the classification service
    #[arg(long)]
    pub(crate) base_url: Option<String>,
    /// Anti-forgery token to send with the request
    #[arg(long)]
    pub(crate) token: Option<String>,
    /// Print the rendered panels as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum RuleArg {
    Email,
    Phone,
    Password,
    Message,
    Name,
}

impl From<RuleArg> for ValidationRule {
    fn from(value: RuleArg) -> Self {
        match value {
            RuleArg::Email => ValidationRule::Email,
            RuleArg::Phone => ValidationRule::Phone,
            RuleArg::Password => ValidationRule::Password,
            RuleArg::Message => ValidationRule::MessageLength,
            RuleArg::Name => ValidationRule::NameLength,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    #[arg(value_enum)]
    pub(crate) rule: RuleArg,
    pub(crate) value: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum FormArg {
    Contact,
    Login,
    Signup,
    Search,
}

impl From<FormArg> for FormKind {
    fn from(value: FormArg) -> Self {
        match value {
            FormArg::Contact => FormKind::Contact,
            FormArg::Login => FormKind::Login,
            FormArg::Signup => FormKind::Signup,
            FormArg::Search => FormKind::Search,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct GuardArgs {
    #[arg(value_enum)]
    pub(crate) form: FormArg,
    /// Submitted field as name=value (repeatable)
    #[arg(long = "field", value_parser = parse_field)]
    pub(crate) fields: Vec<(String, String)>,
}

pub(crate) async fn run_value(
    args: ValueArgs,
    config: &AppConfig,
    surface: NotificationSurface,
) -> Result<(), AppError> {
    let mut estimator = ValuationEstimator::new(surface, config.ui.valuation_delay);
    *estimator.draft_mut() = ValuationDraft {
        brand: args.brand,
        model_year: args.year,
        mileage_km: args.mileage,
        condition: args.condition,
    };

    println!("Car valuation");
    if let Ok(result) = estimator.calculate().await {
        println!("Estimated value: {}", result.display());
        println!("This is an estimated value based on market trends");
    }
    Ok(())
}

pub(crate) async fn run_classify(
    args: ClassifyArgs,
    mut config: AppConfig,
    surface: NotificationSurface,
) -> Result<(), AppError> {
    if let Some(base_url) = args.base_url {
        config.classifier.base_url = normalize_base_url(&base_url)?;
    }
    let token = args
        .token
        .or_else(|| config.classifier.csrf_token.clone())
        .map(AntiForgeryToken::new)
        .ok_or(ConfigError::MissingCsrfToken)?;

    let gateway = Arc::new(HttpClassifierGateway::new(&config.classifier)?);
    info!(endpoint = gateway.endpoint(), "classifying text");
    let workflow = ClassificationWorkflow::new(gateway, surface, token);

    let outcome = workflow.submit(&args.text).await;
    if args.json {
        match serde_json::to_string_pretty(&workflow.panels()) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Panels unavailable: {err}"),
        }
    } else if !matches!(outcome, SubmitOutcome::Invalid) {
        render_panels(&workflow.panels());
    }
    Ok(())
}

pub(crate) fn run_validate(args: ValidateArgs) {
    let rule = ValidationRule::from(args.rule);
    let result = rule.check(&args.value);
    match result.reason {
        None => println!("{}: valid", rule.label()),
        Some(reason) => println!("{}: invalid ({})", rule.label(), reason),
    }
}

pub(crate) fn run_guard(args: GuardArgs, surface: &NotificationSurface) {
    let fields: FormFields = args.fields.into_iter().collect();
    let guard = FormGuard::for_form(args.form.into());

    println!("{} form", guard.form().label());
    for rule in guard.rules() {
        if let Some(feedback) = field_feedback(rule.field, &fields) {
            let hint = feedback
                .hint
                .map(|hint| format!(" ({hint})"))
                .unwrap_or_default();
            println!("- {}: {:?}{}", rule.field, feedback.state, hint);
        }
    }

    match guard.submit(&fields, surface) {
        Ok(permit) => println!(
            "Submission allowed; busy indicator held: {}",
            permit.holds_busy_indicator()
        ),
        Err(rejection) => println!("Submission blocked at '{}'", rejection.field),
    }
}

use crate::infra::{render_panels, StubClassifier};
use carhub::config::AppConfig;
use carhub::error::AppError;
use carhub::forms::{field_feedback, request_password_reset, FormFields, FormGuard};
use carhub::notifications::NotificationSurface;
use carhub::workflows::classification::{AntiForgeryToken, ClassificationWorkflow};
use carhub::workflows::valuation::{ValuationDraft, ValuationEstimator};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the form guard portion of the demo.
    #[arg(long)]
    pub(crate) skip_forms: bool,
    /// Skip the valuation portion of the demo.
    #[arg(long)]
    pub(crate) skip_valuation: bool,
    /// Skip the classification portion of the demo.
    #[arg(long)]
    pub(crate) skip_classification: bool,
}

pub(crate) async fn run_demo(
    args: DemoArgs,
    config: &AppConfig,
    surface: NotificationSurface,
) -> Result<(), AppError> {
    if !args.skip_forms {
        demo_forms(config, &surface).await;
    }
    if !args.skip_valuation {
        demo_valuation(config, &surface).await;
    }
    if !args.skip_classification {
        demo_classification(&surface).await;
    }

    println!();
    println!(
        "Notifications issued: {} ({} still visible)",
        surface.history().len(),
        surface.visible().len()
    );
    Ok(())
}

async fn demo_forms(config: &AppConfig, surface: &NotificationSurface) {
    println!("== Contact form ==");
    let contact = FormGuard::contact();
    let mut fields = FormFields::new()
        .with("first_name", "Ayesha")
        .with("last_name", "Khan")
        .with("email", "ayesha@example")
        .with("message", "Is the 2019 Corolla still available?");
    if let Some(feedback) = field_feedback("email", &fields) {
        println!("email field: {:?}", feedback.state);
    }
    let _ = contact.submit(&fields, surface);

    fields.insert("email", "ayesha@example.com");
    if let Some(feedback) = field_feedback("message", &fields) {
        println!(
            "message field: {:?} {}",
            feedback.state,
            feedback.hint.unwrap_or_default()
        );
    }
    if let Ok(permit) = contact.submit(&fields, surface) {
        println!(
            "contact form submitted (busy indicator held: {})",
            permit.holds_busy_indicator()
        );
    }

    println!("== Signup form ==");
    let signup = FormFields::new()
        .with("username", "ayesha")
        .with("email", "ayesha@example.com")
        .with("password1", "showroom-2024")
        .with("password2", "showroom-2025");
    if let Some(feedback) = field_feedback("password2", &signup) {
        println!(
            "confirm password: {:?} {}",
            feedback.state,
            feedback.hint.unwrap_or_default()
        );
    }
    let _ = FormGuard::signup().submit(&signup, surface);

    println!("== Forgot password ==");
    let _ = request_password_reset(surface, "not-an-email", config.ui.valuation_delay).await;
    let _ = request_password_reset(surface, "ayesha@example.com", config.ui.valuation_delay).await;
}

async fn demo_valuation(config: &AppConfig, surface: &NotificationSurface) {
    println!("== Car valuation ==");
    let mut estimator = ValuationEstimator::new(surface.clone(), config.ui.valuation_delay);
    *estimator.draft_mut() = ValuationDraft {
        brand: Some("toyota".to_string()),
        model_year: Some("2020".to_string()),
        mileage_km: None,
        condition: Some("good".to_string()),
    };
    let _ = estimator.calculate().await;

    estimator.draft_mut().mileage_km = Some("45000".to_string());
    match estimator.calculate().await {
        Ok(result) => println!("Estimated value: {}", result.display()),
        Err(rejection) => println!("Valuation rejected: {rejection}"),
    }
    estimator.dismiss();
}

async fn demo_classification(surface: &NotificationSurface) {
    println!("== News classification ==");
    let stub = Arc::new(StubClassifier::default());
    let workflow = ClassificationWorkflow::new(
        Arc::clone(&stub),
        surface.clone(),
        AntiForgeryToken::new("demo-token"),
    );

    let samples = [
        "   ",
        "Shocking miracle cure the dealers don't want you to know",
        "Suzuki announces revised pricing for the 2025 Alto",
    ];
    for text in samples {
        println!("> {:?}", text.trim());
        workflow.submit(text).await;
        render_panels(&workflow.panels());
    }
    println!("classifier calls: {}", stub.calls());
}

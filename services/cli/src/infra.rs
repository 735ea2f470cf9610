use async_trait::async_trait;
use carhub::config::AppConfig;
use carhub::notifications::{Notification, NotificationSurface, SurfaceObserver};
use carhub::workflows::classification::{
    AnalysisOutcome, AntiForgeryToken, ClassificationRequest, ClassificationVerdict,
    ClassifierGateway, GatewayError, NewsLabel, PanelView,
};
use chrono::Local;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Prints notifications as they would appear stacked in the page corner.
#[derive(Debug, Default)]
pub(crate) struct ConsoleObserver;

impl SurfaceObserver for ConsoleObserver {
    fn notification_shown(&self, notification: &Notification) {
        println!(
            "  [{} {}] {}",
            notification.issued_at.with_timezone(&Local).format("%H:%M:%S"),
            notification.severity.label(),
            notification.message
        );
    }

    fn busy_changed(&self, busy: bool) {
        if busy {
            println!("  ... working");
        }
    }
}

pub(crate) fn page_surface(config: &AppConfig) -> NotificationSurface {
    NotificationSurface::new(config.ui.notification_ttl).with_observer(Arc::new(ConsoleObserver))
}

pub(crate) fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("field name missing in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

pub(crate) fn render_panels(panels: &PanelView) {
    if let Some(result) = &panels.result {
        println!("{}", result.headline);
        println!("- Confidence: {}", result.confidence);
        println!("- Fake probability: {}", result.fake_probability);
        println!("- Real probability: {}", result.real_probability);
    }
    if let Some(error) = &panels.error {
        println!("Analysis failed: {}", error);
    }
}

/// Keyword heuristic standing in for the remote model during demos.
#[derive(Debug, Default)]
pub(crate) struct StubClassifier {
    calls: AtomicUsize,
}

const SENSATIONAL_WORDS: &[&str] = &["shocking", "miracle", "secret", "you won't believe"];

impl StubClassifier {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ClassifierGateway for StubClassifier {
    async fn analyze(
        &self,
        request: &ClassificationRequest,
        token: &AntiForgeryToken,
    ) -> Result<AnalysisOutcome, GatewayError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if token.as_str().is_empty() {
            return Ok(AnalysisOutcome::Failed {
                message: "CSRF token missing or incorrect.".to_string(),
            });
        }

        let lowered = request.text().to_lowercase();
        let hits = SENSATIONAL_WORDS
            .iter()
            .filter(|word| lowered.contains(*word))
            .count();
        let fake_pct = (20.0 + hits as f64 * 35.0).min(97.5);
        let real_pct = 100.0 - fake_pct;
        let label = if fake_pct > real_pct {
            NewsLabel::Fake
        } else {
            NewsLabel::Real
        };

        Ok(AnalysisOutcome::Verdict(ClassificationVerdict {
            label,
            prediction: Some(match label {
                NewsLabel::Fake => "Fake News".to_string(),
                NewsLabel::Real => "Real News".to_string(),
            }),
            confidence: format!("{:.2}", fake_pct.max(real_pct)),
            fake_probability: format!("{:.2}", fake_pct),
            real_probability: format!("{:.2}", real_pct),
        }))
    }
}

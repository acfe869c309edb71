use std::env;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use survey_core::model::{Category, ParticipantId, Response, Session, SessionStats};

use crate::error::ReportError;

/// Where completed sessions are reported to.
#[derive(Clone, Debug)]
pub struct ReporterConfig {
    pub endpoint: String,
}

impl ReporterConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("SURVEY_REPORT_URL").ok()?;
        if endpoint.trim().is_empty() {
            return None;
        }
        Some(Self { endpoint })
    }
}

/// Structured payload delivered to the external result collector.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub participant: ParticipantId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub total_trials: usize,
    pub accuracy_percent: f64,
    pub mean_quality: CategoryMeans,
    pub responses: Vec<Response>,
}

/// Mean quality score per true category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryMeans {
    pub noisy: f64,
    pub original: f64,
    pub denoised: f64,
}

impl SessionReport {
    /// Builds the report from a completed session.
    #[must_use]
    pub fn new(
        participant: ParticipantId,
        session: &Session,
        stats: &SessionStats,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            participant,
            started_at: session.started_at(),
            completed_at,
            total_trials: session.total_trials(),
            accuracy_percent: stats.accuracy_percent(),
            mean_quality: CategoryMeans {
                noisy: stats.mean_quality(Category::Noisy),
                original: stats.mean_quality(Category::Original),
                denoised: stats.mean_quality(Category::Denoised),
            },
            responses: session.responses().to_vec(),
        }
    }
}

/// One-shot outbound delivery of completed sessions.
///
/// A single attempt, no retry; delivery is never guaranteed and local
/// state never depends on the outcome.
#[derive(Clone)]
pub struct ResultReporter {
    client: Client,
    config: Option<ReporterConfig>,
}

impl ResultReporter {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ReporterConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ReporterConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self::new(Some(ReporterConfig {
            endpoint: endpoint.into(),
        }))
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Deliver the report to the configured collector.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` when reporting is disabled, the request
    /// fails, or the collector responds with a non-success status.
    pub async fn submit(&self, report: &SessionReport) -> Result<(), ReportError> {
        let config = self.config.as_ref().ok_or(ReportError::Disabled)?;

        let response = self
            .client
            .post(&config.endpoint)
            .json(report)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReportError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

/// Fire-and-forget report submission on a detached task.
///
/// Failures are logged and never surfaced; the caller's state
/// transition does not wait for the outcome.
pub fn dispatch(reporter: Arc<ResultReporter>, report: SessionReport) {
    if !reporter.enabled() {
        tracing::debug!("result reporting disabled; skipping submission");
        return;
    }
    tokio::spawn(async move {
        match reporter.submit(&report).await {
            Ok(()) => {
                tracing::debug!(participant = %report.participant, "session report delivered");
            }
            Err(err) => {
                tracing::warn!(error = %err, "session report failed; not retried");
            }
        }
    });
}

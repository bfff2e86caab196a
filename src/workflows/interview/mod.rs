pub mod artifact;
pub mod calendar;
pub mod controller;
pub mod domain;
pub mod questions;
pub mod repair;
pub mod retrieval;
pub mod scoring;
pub mod shortlist;
pub mod validate;

pub use artifact::{InterviewArtifact, RunMetrics, ShortlistEntry};
pub use calendar::{CalendarGateway, InterviewScheduler, ScheduleOutcome, ScheduleStatus};
pub use controller::{PipelineController, Stage};
pub use domain::{Candidate, JobDescription, PipelineState};
pub use questions::{OfflineTailor, QuestionTailor, TailorError};
pub use retrieval::{Embedder, HashEmbedder, QuestionBank, QuestionBankError};

use crate::config::PipelineConfig;
use crate::resilience::{CircuitBreaker, RetryPolicy};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Bank(#[from] QuestionBankError),
    #[error(transparent)]
    Schedule(#[from] calendar::ScheduleError),
    #[error("unable to write pipeline artifact: {0}")]
    Artifact(#[from] std::io::Error),
}

/// Facade wiring the question bank, tailor, scheduler, and controller
/// together for one-call runs from the CLI and the HTTP endpoint.
///
/// The circuit breaker lives inside the scheduler, so repeated runs through
/// the same workflow share breaker state.
pub struct InterviewWorkflow {
    bank: QuestionBank,
    tailor: Box<dyn QuestionTailor>,
    scheduler: InterviewScheduler,
    config: PipelineConfig,
}

impl InterviewWorkflow {
    /// Build from configuration with the offline embedder; `gateway` is the
    /// optional remote calendar.
    pub fn from_config(
        config: PipelineConfig,
        tailor: Box<dyn QuestionTailor>,
        gateway: Option<Box<dyn CalendarGateway>>,
    ) -> Result<Self, WorkflowError> {
        let bank = QuestionBank::open(
            &config.questions.bank_path,
            &config.artifacts_dir,
            Arc::new(HashEmbedder::default()),
        )?;
        let breaker = Arc::new(CircuitBreaker::new(
            config.resilience.breaker_threshold,
            config.resilience.breaker_cooldown,
        ));
        let retry = RetryPolicy::new(
            config.resilience.retry_attempts,
            std::time::Duration::from_secs(1),
            std::time::Duration::from_secs(8),
        );
        let scheduler = InterviewScheduler::new(gateway, breaker, retry, &config.artifacts_dir);
        Ok(Self::with_components(config, bank, tailor, scheduler))
    }

    /// Assemble from pre-built parts; the seam tests use to inject fakes.
    pub fn with_components(
        config: PipelineConfig,
        bank: QuestionBank,
        tailor: Box<dyn QuestionTailor>,
        scheduler: InterviewScheduler,
    ) -> Self {
        Self {
            bank,
            tailor,
            scheduler,
            config,
        }
    }

    /// Run the full pipeline for one job description and candidate batch,
    /// schedule the interview slot, and persist `output.json`.
    pub fn run(
        &self,
        jd: JobDescription,
        candidates: Vec<Candidate>,
        when: Option<DateTime<Utc>>,
    ) -> Result<InterviewArtifact, WorkflowError> {
        let started = Instant::now();
        info!(title = %jd.title, candidates = candidates.len(), "interview pipeline start");

        let state = PipelineState::new(jd, candidates);
        let controller = PipelineController::new(&self.bank, self.tailor.as_ref(), &self.config);
        let state = controller.run(state);

        let start = when.unwrap_or_else(|| default_start(Utc::now()));
        let summary = format!("Interview: {}", state.jd.title);
        let schedule = self
            .scheduler
            .schedule(&summary, start, 30, "Google Meet")?;

        let artifact =
            InterviewArtifact::from_run(&state, &schedule, started.elapsed().as_secs_f64());
        artifact.write(&self.config.artifacts_dir)?;
        Ok(artifact)
    }
}

/// Default interview slot: tomorrow at 10:00 UTC.
pub fn default_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = (now + Duration::days(1)).date_naive();
    let slot = tomorrow.and_hms_opt(10, 0, 0).expect("10:00 is valid");
    DateTime::from_naive_utc_and_offset(slot, Utc)
}

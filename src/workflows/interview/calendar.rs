use crate::resilience::{CircuitBreaker, RetryPolicy};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Payload handed to the remote calendar backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: String,
}

/// Error surfaced by a calendar backend; timeouts count as failures for
/// breaker and retry accounting.
#[derive(Debug, thiserror::Error)]
pub enum CalendarApiError {
    #[error("calendar backend failed: {0}")]
    Backend(String),
    #[error("calendar call timed out")]
    Timeout,
}

/// Remote calendar capability. Real implementations wrap an external service;
/// credential handling stays behind the implementation.
pub trait CalendarGateway: Send + Sync {
    fn insert_event(&self, event: &CalendarEvent) -> Result<String, CalendarApiError>;
}

/// How the scheduling attempt resolved. The ICS fallback exists in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Inserted,
    FallbackIcs,
    SkippedDisabled,
    BreakerOpen,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleOutcome {
    pub status: ScheduleStatus,
    pub ics_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("unable to write calendar fallback: {0}")]
    Io(#[from] std::io::Error),
}

/// Schedules interviews against an optional remote calendar, guarded by a
/// circuit breaker and bounded retry.
///
/// The ICS fallback file is written before any remote attempt, so the
/// scheduling intent survives every remote failure mode.
pub struct InterviewScheduler {
    gateway: Option<Box<dyn CalendarGateway>>,
    breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
    artifacts_dir: PathBuf,
}

impl InterviewScheduler {
    pub fn new(
        gateway: Option<Box<dyn CalendarGateway>>,
        breaker: Arc<CircuitBreaker>,
        retry: RetryPolicy,
        artifacts_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gateway,
            breaker,
            retry,
            artifacts_dir: artifacts_dir.into(),
        }
    }

    pub fn schedule(
        &self,
        summary: &str,
        start: DateTime<Utc>,
        duration_min: i64,
        location: &str,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        let event = CalendarEvent {
            summary: summary.to_string(),
            start,
            end: start + Duration::minutes(duration_min),
            location: location.to_string(),
        };

        let ics_path = write_ics(&self.artifacts_dir, &event)?;

        let Some(gateway) = self.gateway.as_deref() else {
            return Ok(ScheduleOutcome {
                status: ScheduleStatus::SkippedDisabled,
                ics_path,
                detail: None,
            });
        };

        if !self.breaker.allow() {
            warn!(summary, "calendar breaker open, skipping remote insert");
            return Ok(ScheduleOutcome {
                status: ScheduleStatus::BreakerOpen,
                ics_path,
                detail: None,
            });
        }

        match self.retry.run(|| gateway.insert_event(&event)) {
            Ok(event_id) => {
                self.breaker.record_success();
                info!(summary, event_id, "calendar event inserted");
                Ok(ScheduleOutcome {
                    status: ScheduleStatus::Inserted,
                    ics_path,
                    detail: Some(event_id),
                })
            }
            Err(err) => {
                self.breaker.record_failure();
                warn!(
                    summary,
                    attempts = self.retry.attempts(),
                    %err,
                    "calendar insert failed, keeping ICS fallback"
                );
                let mut detail = err.to_string();
                if detail.chars().count() > 200 {
                    detail = detail.chars().take(200).collect();
                }
                Ok(ScheduleOutcome {
                    status: ScheduleStatus::FallbackIcs,
                    ics_path,
                    detail: Some(detail),
                })
            }
        }
    }
}

fn format_ics_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Write the plain-text invite. The UID derives from the start timestamp, so
/// re-running the same schedule overwrites the same invite.
fn write_ics(dir: &Path, event: &CalendarEvent) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(dir)?;

    let uid = format!("interview-{}@recruit-ai", event.start.timestamp());
    let mut body = String::new();
    let _ = writeln!(body, "BEGIN:VCALENDAR");
    let _ = writeln!(body, "VERSION:2.0");
    let _ = writeln!(body, "PRODID:-//Recruit Orchestrator//EN");
    let _ = writeln!(body, "BEGIN:VEVENT");
    let _ = writeln!(body, "UID:{uid}");
    let _ = writeln!(body, "DTSTAMP:{}", format_ics_timestamp(event.start));
    let _ = writeln!(body, "DTSTART:{}", format_ics_timestamp(event.start));
    let _ = writeln!(body, "DTEND:{}", format_ics_timestamp(event.end));
    let _ = writeln!(body, "SUMMARY:{}", event.summary);
    let _ = writeln!(body, "LOCATION:{}", event.location);
    let _ = writeln!(body, "END:VEVENT");
    let _ = write!(body, "END:VCALENDAR");

    let path = dir.join("invite.ics");
    fs::write(&path, body)?;
    Ok(path)
}

use super::calendar::{ScheduleOutcome, ScheduleStatus};
use super::domain::PipelineState;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name plus final score, the shortlist shape downstream consumers read.
#[derive(Debug, Clone, Serialize)]
pub struct ShortlistEntry {
    pub name: String,
    pub score: f64,
}

/// Operational summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub elapsed_seconds: f64,
    pub num_candidates: usize,
    pub shortlist_len: usize,
    pub needed_widening: bool,
    pub num_questions: usize,
    pub calendar_status: ScheduleStatus,
    pub used_fallback: bool,
    pub breaker_open: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactPaths {
    pub invite_ics: PathBuf,
}

/// The structured record emitted for downstream consumption (report
/// rendering, email drafting). Always produced; `schema_ok` and `violations`
/// are the signal of degraded quality.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewArtifact {
    pub jd_title: String,
    pub must_haves: Vec<String>,
    pub shortlist: Vec<ShortlistEntry>,
    pub questions: Vec<String>,
    pub schema_ok: bool,
    pub violations: Vec<String>,
    pub artifacts: ArtifactPaths,
    pub metrics: RunMetrics,
}

impl InterviewArtifact {
    pub fn from_run(
        state: &PipelineState,
        schedule: &ScheduleOutcome,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            jd_title: state.jd.title.clone(),
            must_haves: state.jd.must_haves.clone(),
            shortlist: state
                .shortlisted
                .iter()
                .map(|c| ShortlistEntry {
                    name: c.name.clone(),
                    score: c.score,
                })
                .collect(),
            questions: state.questions.clone(),
            schema_ok: state.schema_ok,
            violations: state.violations.clone(),
            artifacts: ArtifactPaths {
                invite_ics: schedule.ics_path.clone(),
            },
            metrics: RunMetrics {
                elapsed_seconds: (elapsed_seconds * 1000.0).round() / 1000.0,
                num_candidates: state.candidates.len(),
                shortlist_len: state.shortlisted.len(),
                needed_widening: state.needs_disambiguation,
                num_questions: state.questions.len(),
                calendar_status: schedule.status,
                used_fallback: schedule.status != ScheduleStatus::Inserted,
                breaker_open: schedule.status == ScheduleStatus::BreakerOpen,
            },
        }
    }

    /// Persist as `output.json` in the artifacts directory.
    pub fn write(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join("output.json");
        let body = serde_json::to_vec_pretty(self).map_err(io::Error::other)?;
        fs::write(&path, body)?;
        Ok(path)
    }
}

use serde::{Deserialize, Serialize};

/// Structured job description extracted upstream from the raw posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    pub title: String,
    pub must_haves: Vec<String>,
    #[serde(default)]
    pub nice_haves: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// One applicant parsed from a resume. Created once per source document and
/// never removed during a run; `score` is recomputed by each scoring pass and
/// is owned by the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub years_exp: u32,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub score: f64,
    pub resume_path: String,
}

/// State handed from stage to stage. Each stage takes the value, writes only
/// the fields it owns, and returns a new value; `violations` is append-only
/// within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub jd: JobDescription,
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub shortlisted: Vec<Candidate>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub policy_violation: bool,
    #[serde(default)]
    pub needs_disambiguation: bool,
    #[serde(default)]
    pub schema_ok: bool,
    #[serde(default)]
    pub violations: Vec<String>,
}

impl PipelineState {
    pub fn new(jd: JobDescription, candidates: Vec<Candidate>) -> Self {
        Self {
            jd,
            candidates,
            shortlisted: Vec::new(),
            questions: Vec::new(),
            policy_violation: false,
            needs_disambiguation: false,
            schema_ok: false,
            violations: Vec::new(),
        }
    }
}

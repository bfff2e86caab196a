use super::domain::JobDescription;
use super::retrieval::QuestionBank;
use crate::config::QuestionSettings;
use std::collections::HashSet;
use tracing::{info, warn};

/// Shortest line still counted as a question after cleanup.
const MIN_QUESTION_CHARS: usize = 6;

#[derive(Debug, thiserror::Error)]
#[error("question tailoring failed: {0}")]
pub struct TailorError(pub String);

/// Best-effort capability rewriting retrieved questions for a specific role.
///
/// Implementations wrap a text-generation service and may fail or time out;
/// the adapter treats any error as a signal to fall back to the retrieved
/// questions verbatim.
pub trait QuestionTailor: Send + Sync {
    fn tailor(
        &self,
        jd: &JobDescription,
        base_questions: &[String],
        target_min: usize,
        target_max: usize,
    ) -> Result<Vec<String>, TailorError>;
}

/// Stand-in used when no tailoring backend is configured; always errors so
/// the adapter takes the retrieved-questions fallback.
#[derive(Debug, Default, Clone)]
pub struct OfflineTailor;

impl QuestionTailor for OfflineTailor {
    fn tailor(
        &self,
        _jd: &JobDescription,
        _base_questions: &[String],
        _target_min: usize,
        _target_max: usize,
    ) -> Result<Vec<String>, TailorError> {
        Err(TailorError("no tailoring backend configured".to_string()))
    }
}

/// Retrieval query for the corpus: role title plus the must-have list.
pub fn build_query(jd: &JobDescription) -> String {
    let title = jd.title.trim();
    let title = if title.is_empty() { "Role" } else { title };
    let must = jd
        .must_haves
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{title} :: {must}")
}

/// Produce a bounded, deduplicated question list for the role.
///
/// Retrieves `top_k` candidates from the bank, asks the tailor to adapt them,
/// then cleans, dedupes case-insensitively, tops up with untailored retrieved
/// questions to `target_min`, and truncates to `target_max`. Tailor failure
/// of any kind falls back entirely to the retrieved questions; this never
/// fails the pipeline.
pub fn generate_questions(
    jd: &JobDescription,
    bank: &QuestionBank,
    tailor: &dyn QuestionTailor,
    settings: &QuestionSettings,
) -> Vec<String> {
    let query = build_query(jd);
    let retrieved = match bank.search(&query, settings.top_k_retrieve) {
        Ok(retrieved) => retrieved,
        Err(err) => {
            warn!(%err, "question retrieval failed, continuing with empty pool");
            Vec::new()
        }
    };

    match tailor.tailor(jd, &retrieved, settings.target_min, settings.target_max) {
        Ok(lines) => {
            let mut seen = HashSet::new();
            let mut questions = Vec::new();
            for line in &lines {
                let cleaned = clean_line(line);
                if cleaned.len() < MIN_QUESTION_CHARS {
                    continue;
                }
                if seen.insert(cleaned.to_lowercase()) {
                    questions.push(cleaned);
                }
            }

            // Top up with retrieved questions until the minimum is met.
            for question in &retrieved {
                if questions.len() >= settings.target_min {
                    break;
                }
                if seen.insert(question.to_lowercase()) {
                    questions.push(question.clone());
                }
            }

            questions.truncate(settings.target_max);
            info!(count = questions.len(), "questions tailored");
            questions
        }
        Err(err) => {
            warn!(reason = %err, "question tailoring unavailable, using retrieved questions");
            let mut seen = HashSet::new();
            let mut fallback = Vec::new();
            for question in &retrieved {
                if seen.insert(question.to_lowercase()) {
                    fallback.push(question.clone());
                }
                if fallback.len() >= settings.target_max {
                    break;
                }
            }
            fallback
        }
    }
}

fn clean_line(line: &str) -> String {
    line.trim()
        .trim_start_matches('-')
        .trim()
        .to_string()
}

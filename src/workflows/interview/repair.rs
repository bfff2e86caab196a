use super::domain::PipelineState;
use super::validate::{check_final_contract, check_stage_contract};
use std::collections::HashSet;
use tracing::info;

/// Hard cap on questions carried into the final artifact.
const ARTIFACT_MAX_QUESTIONS: usize = 12;
/// Practical floor the repair stage tops up to.
const ARTIFACT_MIN_QUESTIONS: usize = 8;

/// Mechanically repair validator-detected defects without inventing facts.
///
/// Questions are deduplicated and trimmed to the artifact cap; a shortfall is
/// topped up from unused must-have skills with a fixed template, never from
/// skills outside the job description. An empty shortlist is repaired by
/// promoting the single best-scoring candidate, if any exist. The state is
/// then re-validated; residual violations are recorded but do not block
/// artifact emission.
pub fn repair(mut state: PipelineState) -> PipelineState {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();
    for question in &state.questions {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            cleaned.push(trimmed.to_string());
        }
    }

    let mut skills = state.jd.must_haves.iter();
    while cleaned.len() < ARTIFACT_MIN_QUESTIONS {
        let Some(skill) = skills.next() else { break };
        let skill = skill.trim();
        if skill.is_empty() {
            continue;
        }
        let synthesized = format!("Can you share a recent example using {skill}?");
        if seen.insert(synthesized.to_lowercase()) {
            cleaned.push(synthesized);
        }
    }
    cleaned.truncate(ARTIFACT_MAX_QUESTIONS);
    state.questions = cleaned;

    if state.shortlisted.is_empty() && !state.candidates.is_empty() {
        let best = state
            .candidates
            .iter()
            .max_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned();
        if let Some(best) = best {
            info!(name = %best.name, score = best.score, "promoting best candidate into empty shortlist");
            state.shortlisted = vec![best];
        }
    }

    let stage_violations = check_stage_contract(&state);
    state.schema_ok = stage_violations.is_empty();
    state.violations.extend(stage_violations);

    let final_violations = check_final_contract(&state);
    state.schema_ok = final_violations.is_empty();
    state.violations.extend(final_violations);

    info!(
        questions = state.questions.len(),
        shortlisted = state.shortlisted.len(),
        schema_ok = state.schema_ok,
        "repair complete"
    );

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::interview::domain::{Candidate, JobDescription};

    fn base_state() -> PipelineState {
        let jd = JobDescription {
            title: "ML Engineer".to_string(),
            must_haves: vec![
                "Python".to_string(),
                "PyTorch".to_string(),
                "SQL".to_string(),
            ],
            nice_haves: Vec::new(),
            location: None,
        };
        let candidates = vec![
            Candidate {
                name: "Low".to_string(),
                email: None,
                years_exp: 1,
                skills: Vec::new(),
                score: 0.2,
                resume_path: "resumes/low.txt".to_string(),
            },
            Candidate {
                name: "High".to_string(),
                email: None,
                years_exp: 6,
                skills: Vec::new(),
                score: 0.9,
                resume_path: "resumes/high.txt".to_string(),
            },
        ];
        PipelineState::new(jd, candidates)
    }

    #[test]
    fn synthesizes_questions_from_must_haves_only() {
        let mut state = base_state();
        state.shortlisted = vec![state.candidates[1].clone()];
        state.questions = vec![
            "Describe a model you shipped.".to_string(),
            "  ".to_string(),
            "describe a model you shipped.".to_string(),
        ];
        let repaired = repair(state);

        assert!(repaired
            .questions
            .contains(&"Can you share a recent example using Python?".to_string()));
        // one real question + three must-have templates: short of 8 is allowed,
        // but nothing outside the JD appears
        assert_eq!(repaired.questions.len(), 4);
        assert!(!repaired.schema_ok);
        assert!(repaired
            .violations
            .iter()
            .any(|v| v.contains("too few questions")));
    }

    #[test]
    fn trims_question_overflow_to_artifact_cap() {
        let mut state = base_state();
        state.shortlisted = vec![state.candidates[1].clone()];
        state.questions = (0..25).map(|i| format!("Question number {i}?")).collect();
        let repaired = repair(state);
        assert_eq!(repaired.questions.len(), 12);
        assert!(repaired.schema_ok);
    }

    #[test]
    fn promotes_best_candidate_into_empty_shortlist() {
        let mut state = base_state();
        state.questions = (0..9).map(|i| format!("Question number {i}?")).collect();
        let repaired = repair(state);
        assert_eq!(repaired.shortlisted.len(), 1);
        assert_eq!(repaired.shortlisted[0].name, "High");
        assert!(repaired.schema_ok);
    }

    #[test]
    fn residual_violations_are_recorded_not_fatal() {
        let mut state = base_state();
        state.candidates.clear();
        state.questions.clear();
        let repaired = repair(state);
        assert!(!repaired.schema_ok);
        assert!(!repaired.violations.is_empty());
        assert!(repaired.questions.len() <= 12);
    }
}

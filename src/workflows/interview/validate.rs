use super::domain::PipelineState;

/// Light structural checks run after question generation to decide whether
/// the repair stage is needed.
pub fn check_stage_contract(state: &PipelineState) -> Vec<String> {
    let mut violations = Vec::new();

    for candidate in &state.shortlisted {
        if candidate.name.trim().is_empty() {
            violations.push("shortlisted candidate missing valid name".to_string());
        }
    }

    let usable = state
        .questions
        .iter()
        .filter(|q| !q.trim().is_empty())
        .count();
    if usable < 5 {
        violations.push("too few questions (<5)".to_string());
    }
    if usable > 20 {
        violations.push("too many questions (>20)".to_string());
    }

    violations
}

/// Strict contract for the final artifact.
pub fn check_final_contract(state: &PipelineState) -> Vec<String> {
    let mut violations = Vec::new();

    if state.jd.title.trim().chars().count() < 2 {
        violations.push("job title shorter than 2 characters".to_string());
    }
    if state.shortlisted.is_empty() {
        violations.push("final shortlist is empty".to_string());
    }
    if state.questions.len() < 5 {
        violations.push("final question list below minimum (5)".to_string());
    }
    if state.questions.len() > 20 {
        violations.push("final question list above maximum (20)".to_string());
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::interview::domain::{Candidate, JobDescription};

    fn state(questions: usize, shortlisted: usize) -> PipelineState {
        let jd = JobDescription {
            title: "QA Lead".to_string(),
            must_haves: vec!["Selenium".to_string()],
            nice_haves: Vec::new(),
            location: None,
        };
        let candidate = Candidate {
            name: "Ada".to_string(),
            email: None,
            years_exp: 3,
            skills: Vec::new(),
            score: 0.5,
            resume_path: "resumes/ada.txt".to_string(),
        };
        let mut st = PipelineState::new(jd, vec![candidate.clone()]);
        st.shortlisted = vec![candidate; shortlisted];
        st.questions = (0..questions)
            .map(|i| format!("Question number {i}?"))
            .collect();
        st
    }

    #[test]
    fn healthy_state_passes_both_contracts() {
        let st = state(9, 2);
        assert!(check_stage_contract(&st).is_empty());
        assert!(check_final_contract(&st).is_empty());
    }

    #[test]
    fn too_few_questions_flagged() {
        let st = state(3, 2);
        let violations = check_stage_contract(&st);
        assert_eq!(violations, vec!["too few questions (<5)".to_string()]);
    }

    #[test]
    fn blank_names_flagged_mid_pipeline() {
        let mut st = state(9, 1);
        st.shortlisted[0].name = "  ".to_string();
        assert!(!check_stage_contract(&st).is_empty());
    }

    #[test]
    fn final_contract_requires_shortlist_and_title() {
        let mut st = state(9, 0);
        st.jd.title = "Q".to_string();
        let violations = check_final_contract(&st);
        assert_eq!(violations.len(), 2);
    }
}

use super::domain::PipelineState;
use super::questions::{generate_questions, QuestionTailor};
use super::repair::repair;
use super::retrieval::QuestionBank;
use super::shortlist::select_shortlist;
use super::validate::{check_final_contract, check_stage_contract};
use crate::config::PipelineConfig;
use tracing::info;

/// Pipeline stages in execution order. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Screen,
    Shortlist,
    GenerateQuestions,
    Repair,
    Done,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Screen => "screen",
            Stage::Shortlist => "shortlist",
            Stage::GenerateQuestions => "generate-questions",
            Stage::Repair => "repair",
            Stage::Done => "done",
        }
    }

    /// Explicit transition table. The only conditional edge routes to
    /// `Repair` when the stage contract failed or a policy flag is set.
    fn next(self, state: &PipelineState) -> Stage {
        match self {
            Stage::Screen => Stage::Shortlist,
            Stage::Shortlist => Stage::GenerateQuestions,
            Stage::GenerateQuestions => {
                if !state.schema_ok || state.policy_violation {
                    Stage::Repair
                } else {
                    Stage::Done
                }
            }
            Stage::Repair | Stage::Done => Stage::Done,
        }
    }
}

/// Stateless controller walking the stage machine over an owned state value.
///
/// Each stage consumes the state and returns a new one; the controller holds
/// only the collaborators the stages need.
pub struct PipelineController<'a> {
    bank: &'a QuestionBank,
    tailor: &'a dyn QuestionTailor,
    config: &'a PipelineConfig,
}

impl<'a> PipelineController<'a> {
    pub fn new(
        bank: &'a QuestionBank,
        tailor: &'a dyn QuestionTailor,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            bank,
            tailor,
            config,
        }
    }

    /// Run the machine from `Screen` to `Done` and hand back the final state,
    /// always annotated by the final contract.
    pub fn run(&self, state: PipelineState) -> PipelineState {
        let mut stage = Stage::Screen;
        let mut state = state;
        let mut repaired = false;

        while stage != Stage::Done {
            info!(stage = stage.label(), "stage start");
            state = match stage {
                Stage::Screen => screen(state),
                Stage::Shortlist => self.shortlist(state),
                Stage::GenerateQuestions => self.generate(state),
                Stage::Repair => {
                    repaired = true;
                    repair(state)
                }
                Stage::Done => state,
            };
            stage = stage.next(&state);
        }

        // Repair already ran the final contract; the happy path still needs
        // its annotation before the artifact is emitted.
        if !repaired {
            let final_violations = check_final_contract(&state);
            state.schema_ok = final_violations.is_empty();
            state.violations.extend(final_violations);
        }

        info!(
            shortlisted = state.shortlisted.len(),
            questions = state.questions.len(),
            schema_ok = state.schema_ok,
            widened = state.needs_disambiguation,
            "pipeline done"
        );
        state
    }

    fn shortlist(&self, mut state: PipelineState) -> PipelineState {
        let outcome = select_shortlist(
            &state.jd,
            std::mem::take(&mut state.candidates),
            &self.config.shortlist,
        );
        state.candidates = outcome.candidates;
        state.shortlisted = outcome.shortlisted;
        if outcome.widened {
            state.needs_disambiguation = true;
        }
        state
    }

    fn generate(&self, mut state: PipelineState) -> PipelineState {
        state.questions =
            generate_questions(&state.jd, self.bank, self.tailor, &self.config.questions);

        let violations = check_stage_contract(&state);
        state.schema_ok = violations.is_empty();
        state.violations.extend(violations);
        state
    }
}

/// Screen stage: clean and case-insensitively dedupe the must-have list,
/// flagging ambiguous job descriptions with fewer than 3 must-haves.
fn screen(mut state: PipelineState) -> PipelineState {
    let mut seen = std::collections::HashSet::new();
    let mut cleaned = Vec::new();
    for skill in &state.jd.must_haves {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            cleaned.push(trimmed.to_string());
        }
    }
    state.jd.must_haves = cleaned;

    if state.jd.must_haves.len() < 3 {
        state.needs_disambiguation = true;
    }

    info!(
        must_haves = state.jd.must_haves.len(),
        needs_disambiguation = state.needs_disambiguation,
        "screen complete"
    );
    state
}

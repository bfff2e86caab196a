use super::domain::{Candidate, JobDescription};
use super::scoring::score_candidate;
use crate::config::ShortlistSettings;
use tracing::info;

/// Result of one shortlist pass: the scored candidate pool plus the selected
/// subset, and whether the widening fallback had to run.
#[derive(Debug, Clone)]
pub struct ShortlistOutcome {
    pub candidates: Vec<Candidate>,
    pub shortlisted: Vec<Candidate>,
    pub widened: bool,
}

/// Score the pool and take the top slice above `min_score`.
///
/// Sort is stable and descending, so score ties keep input order. An empty
/// filtered set falls back to the top `top_n` regardless of threshold.
fn select(jd: &JobDescription, candidates: &mut [Candidate], top_n: usize, min_score: f64) -> Vec<Candidate> {
    for candidate in candidates.iter_mut() {
        candidate.score = score_candidate(jd, candidate);
    }

    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let filtered: Vec<Candidate> = ranked
        .iter()
        .filter(|c| c.score >= min_score)
        .take(top_n)
        .map(|c| (*c).clone())
        .collect();

    if filtered.is_empty() {
        return ranked.into_iter().take(top_n).cloned().collect();
    }
    filtered
}

/// Apply the shortlist policy, widening when the first pass is too thin.
///
/// Guarantees a non-empty shortlist whenever candidates exist: a shortlist
/// under 3 members against a pool of 3 or more triggers a second pass with
/// `top_n_wide` and the threshold scaled by `widen_factor`; if that still
/// comes up short the top 3 by raw score are taken outright.
pub fn select_shortlist(
    jd: &JobDescription,
    mut candidates: Vec<Candidate>,
    settings: &ShortlistSettings,
) -> ShortlistOutcome {
    let mut shortlisted = select(jd, &mut candidates, settings.top_n_first, settings.min_score_first);
    let mut widened = false;

    if shortlisted.len() < 3 && candidates.len() >= 3 {
        widened = true;
        shortlisted = select(
            jd,
            &mut candidates,
            settings.top_n_wide,
            settings.min_score_first * settings.widen_factor,
        );
        if shortlisted.len() < 3 {
            let mut ranked = candidates.clone();
            ranked.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            ranked.truncate(3.min(ranked.len()));
            shortlisted = ranked;
        }
    }

    info!(
        pool = candidates.len(),
        shortlisted = shortlisted.len(),
        widened,
        "shortlist selected"
    );

    ShortlistOutcome {
        candidates,
        shortlisted,
        widened,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ShortlistSettings {
        ShortlistSettings {
            top_n_first: 5,
            min_score_first: 0.35,
            top_n_wide: 7,
            widen_factor: 0.8,
        }
    }

    fn jd() -> JobDescription {
        JobDescription {
            title: "Data Engineer".to_string(),
            must_haves: vec!["Python".to_string(), "SQL".to_string()],
            nice_haves: Vec::new(),
            location: None,
        }
    }

    fn candidate(name: &str, skills: &[&str], years: u32) -> Candidate {
        Candidate {
            name: name.to_string(),
            email: None,
            years_exp: years,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            score: 0.0,
            resume_path: format!("resumes/{name}.txt"),
        }
    }

    #[test]
    fn returns_top_n_sorted_descending() {
        let pool = vec![
            candidate("a", &["python"], 1),
            candidate("b", &["python", "sql"], 5),
            candidate("c", &["python", "sql"], 2),
            candidate("d", &["python", "sql"], 8),
            candidate("e", &["sql"], 0),
            candidate("f", &["python", "sql"], 1),
        ];
        let outcome = select_shortlist(&jd(), pool, &settings());
        assert_eq!(outcome.shortlisted.len(), 5);
        assert!(!outcome.widened);
        for pair in outcome.shortlisted.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(outcome.shortlisted[0].name, "d");
    }

    #[test]
    fn ties_keep_input_order() {
        let pool = vec![
            candidate("first", &["python", "sql"], 2),
            candidate("second", &["python", "sql"], 2),
            candidate("third", &["python", "sql"], 2),
        ];
        let outcome = select_shortlist(&jd(), pool, &settings());
        let names: Vec<&str> = outcome.shortlisted.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn widening_guarantees_three_when_pool_allows() {
        let pool = vec![
            candidate("strong-1", &["python", "sql"], 4),
            candidate("strong-2", &["python", "sql"], 2),
            candidate("weak-1", &["excel"], 0),
            candidate("weak-2", &["word"], 0),
            candidate("weak-3", &[], 0),
        ];
        let outcome = select_shortlist(&jd(), pool, &settings());
        assert!(outcome.widened);
        assert!(outcome.shortlisted.len() >= 3);
        assert_eq!(outcome.shortlisted[0].name, "strong-1");
    }

    #[test]
    fn tiny_pool_skips_widening() {
        let pool = vec![candidate("only", &["cobol"], 1)];
        let outcome = select_shortlist(&jd(), pool, &settings());
        assert!(!outcome.widened);
        // threshold misses, so the top-N fallback still yields the candidate
        assert_eq!(outcome.shortlisted.len(), 1);
    }

    #[test]
    fn scores_are_written_back_to_the_pool() {
        let pool = vec![candidate("a", &["python", "sql"], 0)];
        let outcome = select_shortlist(&jd(), pool, &settings());
        assert_eq!(outcome.candidates[0].score, 0.7);
    }
}

use super::domain::{Candidate, JobDescription};
use std::collections::BTreeSet;

/// Canonical form of a skill or requirement string: trimmed, lowercased,
/// separator runs collapsed to a single space, everything outside
/// `[a-z0-9 +#.-]` stripped. Empty results are dropped by callers.
pub(crate) fn canonize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;

    for ch in value.trim().to_lowercase().chars() {
        let ch = match ch {
            c if c.is_whitespace() => ' ',
            '/' | '|' | ',' | ';' => ' ',
            c => c,
        };
        if ch == ' ' {
            pending_space = !out.is_empty();
            continue;
        }
        if !matches!(ch, 'a'..='z' | '0'..='9' | '+' | '#' | '.' | '-') {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }

    out
}

fn canonical_set(items: &[String]) -> BTreeSet<String> {
    items
        .iter()
        .map(|item| canonize(item))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Fraction of `required` covered by `skills`, after canonicalization.
fn overlap(required: &[String], skills: &[String]) -> f64 {
    let required = canonical_set(required);
    if required.is_empty() {
        return 0.0;
    }
    let skills = canonical_set(skills);
    let shared = required.intersection(&skills).count();
    shared as f64 / required.len().max(1) as f64
}

/// Match score between a job description and one candidate.
///
/// `0.7 * mustOverlap + 0.3 * niceOverlap + min(yearsExp / 10, 0.3)`, rounded
/// to 4 decimal places. Deterministic and side-effect free; the must-have
/// term dominates so missing required skills cannot be bought back with
/// experience.
pub fn score_candidate(jd: &JobDescription, candidate: &Candidate) -> f64 {
    let must = overlap(&jd.must_haves, &candidate.skills);
    let nice = if jd.nice_haves.is_empty() {
        0.0
    } else {
        overlap(&jd.nice_haves, &candidate.skills)
    };
    let exp_bonus = (f64::from(candidate.years_exp) / 10.0).min(0.3);

    let raw = 0.7 * must + 0.3 * nice + exp_bonus;
    (raw * 10_000.0).round() / 10_000.0
}

//! Per-row winner selection.
//!
//! Two acceptance policies exist in this domain and disagree on whether a
//! minimum margin is required before accepting a mark; both are exposed
//! behind [`DecisionPolicy`] instead of being merged silently. A row with
//! no candidates decodes as unknown either way.

use crate::config::DecisionPolicy;
use crate::score::ScoredCandidate;

/// Pick the winning column of one row, or `None` for unknown.
pub(crate) fn decide_row(scored: &[ScoredCandidate], policy: &DecisionPolicy) -> Option<usize> {
    if scored.is_empty() {
        return None;
    }

    let mut best_idx = 0usize;
    let mut best = f32::NEG_INFINITY;
    let mut second = f32::NEG_INFINITY;
    for (idx, candidate) in scored.iter().enumerate() {
        if candidate.score > best {
            second = best;
            best = candidate.score;
            best_idx = idx;
        } else if candidate.score > second {
            second = candidate.score;
        }
    }

    match *policy {
        DecisionPolicy::ArgMax => Some(best_idx),
        DecisionPolicy::MarginGated {
            min_score,
            min_margin,
        } => {
            if best < min_score {
                return None;
            }
            if second.is_finite() && best - second < min_margin {
                return None;
            }
            Some(best_idx)
        }
    }
}

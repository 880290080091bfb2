//! Ordering of scored candidates

use crate::types::ScoredSlot;

/// Ascending by score, ties kept in generation order, truncated to `limit`
pub fn rank(mut scored: Vec<ScoredSlot>, limit: usize) -> Vec<ScoredSlot> {
    // sort_by_key is stable
    scored.sort_by_key(|slot| slot.score);
    scored.truncate(limit);
    scored
}

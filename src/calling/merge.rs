//! Combining the two mates of a paired fragment into one call set.

use tracing::warn;

use crate::core::bitvector::BitVector;
use crate::core::types::PositionCall;

/// Merge the per-read calls of two mates.
///
/// Positions covered by only one mate are copied. Positions where both mates
/// agree keep that call; disagreements go through [`resolve_conflict`].
#[must_use]
pub fn merge_mates(first: &BitVector, second: &BitVector) -> BitVector {
    let mut merged = first.clone();

    for (pos, call) in second.iter() {
        let resolved = match first.get(pos) {
            None => call,
            Some(existing) if existing == call => existing,
            Some(existing) => resolve_conflict(existing, call),
        };
        merged.record(pos, resolved);
    }

    merged
}

/// Pick the call for a position where the two mates disagree.
///
/// Rules apply in order: a clean read-out wins; an ambiguous or missing call
/// defers to the other mate; a deletion against a substitution, or two
/// different substitutions, is ambiguous.
#[must_use]
pub fn resolve_conflict(first: PositionCall, second: PositionCall) -> PositionCall {
    use PositionCall::{Ambiguous, Deletion, Missing, NoMutation, Substitution};

    match (first, second) {
        (NoMutation, _) | (_, NoMutation) => NoMutation,
        (Ambiguous, other) | (other, Ambiguous) => other,
        (Missing, other) | (other, Missing) => other,
        (Deletion, Substitution(_)) | (Substitution(_), Deletion) => Ambiguous,
        (Substitution(a), Substitution(b)) if a != b => Ambiguous,
        _ => {
            warn!(?first, ?second, "Unresolved mate conflict, keeping first mate's call");
            first
        }
    }
}

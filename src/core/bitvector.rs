use std::collections::BTreeMap;

use crate::core::types::PositionCall;

/// Symbol for positions a bit vector does not cover in dense output
pub const UNCOVERED_SYMBOL: char = '.';

/// Sparse per-position calls for one read or one merged fragment.
///
/// Keys are 1-based reference positions. Only positions actually covered by
/// the alignment are present. Backed by a `BTreeMap` so iteration order (and
/// therefore every serialized form) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitVector {
    calls: BTreeMap<usize, PositionCall>,
}

impl BitVector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call, replacing any earlier call at the same position
    pub fn record(&mut self, position: usize, call: PositionCall) {
        self.calls.insert(position, call);
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<PositionCall> {
        self.calls.get(&position).copied()
    }

    #[must_use]
    pub fn contains(&self, position: usize) -> bool {
        self.calls.contains_key(&position)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Iterate `(position, call)` pairs in ascending position order
    pub fn iter(&self) -> impl Iterator<Item = (usize, PositionCall)> + '_ {
        self.calls.iter().map(|(&pos, &call)| (pos, call))
    }

    /// Number of positions carrying the given call
    #[must_use]
    pub fn count(&self, call: PositionCall) -> usize {
        self.calls.values().filter(|&&c| c == call).count()
    }

    /// Number of substitutions
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.calls.values().filter(|c| c.is_mutation()).count()
    }

    /// Render positions `start..=end` as a dense string, one symbol per
    /// position and [`UNCOVERED_SYMBOL`] where the vector has no call.
    #[must_use]
    pub fn to_bit_string(&self, start: usize, end: usize) -> String {
        (start..=end)
            .map(|pos| self.get(pos).map_or(UNCOVERED_SYMBOL, PositionCall::symbol))
            .collect()
    }
}

impl FromIterator<(usize, PositionCall)> for BitVector {
    fn from_iter<T: IntoIterator<Item = (usize, PositionCall)>>(iter: T) -> Self {
        Self {
            calls: iter.into_iter().collect(),
        }
    }
}

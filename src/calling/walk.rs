//! Per-read classification as a fold over decoded CIGAR runs.
//!
//! The walk threads two cursors through the alignment: `ref_pos`, the 1-based
//! reference position, starting at the read's leftmost mapped position, and
//! `read_pos`, the 0-based offset into the read's bases and qualities. Each
//! run is applied by [`step`], which takes the state by value and returns the
//! advanced state, so every run type can be exercised in isolation.

use crate::calling::cigar::{self, AlignmentOp, Opcode};
use crate::calling::deletion;
use crate::calling::engine::ClassifierConfig;
use crate::core::bitvector::BitVector;
use crate::core::quality::QualityTable;
use crate::core::read::AlignedRead;
use crate::core::reference::ReferenceSequence;
use crate::core::types::PositionCall;

/// Read-only inputs shared by every step of one walk
#[derive(Debug, Clone, Copy)]
pub struct WalkContext<'a> {
    pub read: &'a AlignedRead,
    pub reference: &'a ReferenceSequence,
    pub qualities: &'a QualityTable,
    pub config: &'a ClassifierConfig,
}

/// Cursor positions plus the calls recorded so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkState {
    /// Next reference position (1-based)
    pub ref_pos: usize,
    /// Next read offset (0-based)
    pub read_pos: usize,
    pub calls: BitVector,
}

impl WalkState {
    #[must_use]
    pub fn start(position: usize) -> Self {
        Self {
            ref_pos: position,
            read_pos: 0,
            calls: BitVector::new(),
        }
    }
}

/// Classify every covered position of one read
#[must_use]
pub fn classify_read(ctx: &WalkContext<'_>) -> BitVector {
    let ops = cigar::decode(&ctx.read.cigar);
    let last = ops.len().saturating_sub(1);

    ops.iter()
        .enumerate()
        .fold(WalkState::start(ctx.read.position), |state, (idx, &op)| {
            step(state, op, idx == last, ctx)
        })
        .calls
}

/// Apply one CIGAR run to the walk state
#[must_use]
pub fn step(state: WalkState, op: AlignmentOp, is_last: bool, ctx: &WalkContext<'_>) -> WalkState {
    match op.opcode {
        Opcode::MatchOrMismatch | Opcode::SequenceMatch | Opcode::SequenceMismatch => {
            walk_match(state, op.length, ctx)
        }
        Opcode::Deletion | Opcode::SkippedRegion => walk_deletion(state, op.length, ctx),
        Opcode::Insertion => WalkState {
            read_pos: state.read_pos.saturating_add(op.length),
            ..state
        },
        Opcode::SoftClip => walk_soft_clip(state, op.length, is_last, ctx),
        Opcode::HardClip | Opcode::Padding => state,
    }
}

/// Call each aligned base against the reference.
///
/// Stops early once the read runs out of bases or qualities; reference
/// positions outside the sequence are stepped over without a call.
fn walk_match(mut state: WalkState, length: usize, ctx: &WalkContext<'_>) -> WalkState {
    let available = ctx.read.available_len();

    for _ in 0..length {
        if state.read_pos >= available {
            break;
        }

        if let Some(ref_base) = ctx.reference.base_at(state.ref_pos) {
            let read_base = ctx.read.bases[state.read_pos];
            let score = ctx.qualities.score(ctx.read.qualities[state.read_pos]);

            let call = if score <= ctx.config.quality_cutoff {
                PositionCall::Ambiguous
            } else if read_base != ref_base {
                PositionCall::Substitution(read_base)
            } else {
                PositionCall::NoMutation
            };
            state.calls.record(state.ref_pos, call);
        }

        state.ref_pos = state.ref_pos.saturating_add(1);
        state.read_pos = state.read_pos.saturating_add(1);
    }

    state
}

/// Interior positions of a deletion are ambiguous; only the final position
/// can be called, and only if the deletion cannot slide elsewhere.
fn walk_deletion(mut state: WalkState, length: usize, ctx: &WalkContext<'_>) -> WalkState {
    if length == 0 {
        return state;
    }

    let interior = length - 1;
    mark_span(&mut state.calls, state.ref_pos, interior, PositionCall::Ambiguous, ctx.reference);
    state.ref_pos = state.ref_pos.saturating_add(interior);

    let end = state.ref_pos;
    if ctx.reference.contains(end) {
        let call = if deletion::is_ambiguous(ctx.reference, end, length, ctx.config.surrounding_bases) {
            PositionCall::Ambiguous
        } else {
            PositionCall::Deletion
        };
        state.calls.record(end, call);
    }
    state.ref_pos = state.ref_pos.saturating_add(1);

    state
}

/// A soft clip consumes read bases. Only a trailing clip claims reference
/// positions, marking the ones right after the alignment as missing.
fn walk_soft_clip(
    mut state: WalkState,
    length: usize,
    is_last: bool,
    ctx: &WalkContext<'_>,
) -> WalkState {
    state.read_pos = state.read_pos.saturating_add(length);

    if is_last {
        mark_span(&mut state.calls, state.ref_pos, length, PositionCall::Missing, ctx.reference);
        state.ref_pos = state.ref_pos.saturating_add(length);
    }

    state
}

/// Record `call` at `start..start + length`, limited to positions inside the
/// reference.
fn mark_span(
    calls: &mut BitVector,
    start: usize,
    length: usize,
    call: PositionCall,
    reference: &ReferenceSequence,
) {
    let first = start.max(1);
    let last = start.saturating_add(length).min(reference.len().saturating_add(1));
    for pos in first..last {
        calls.record(pos, call);
    }
}

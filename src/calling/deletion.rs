//! Positional ambiguity of deletions.
//!
//! A deletion observed in a read is only informative at its reported location
//! if no other placement of a deletion of the same length would produce the
//! same read. In repetitive context (homopolymers, tandem repeats) the aligner
//! picks one placement arbitrarily, so the call cannot be localized.
//!
//! The check compares flanking context. A window of `surrounding` bases on
//! each side of the observed deletion is fixed; the observed context is that
//! window with the deleted span removed. Each alternate placement ending within
//! `length` positions of the observed end removes a different span from the
//! same window. If any alternate leaves an identical context, the deletion is
//! ambiguous.
//!
//! Positions are 1-based at the API boundary and converted once to 0-based
//! half-open offsets. Window edges clamp to the sequence: a window that would
//! start before position 1 starts at position 1, it never wraps around to the
//! far end of the sequence.

use crate::core::reference::ReferenceSequence;

/// Fixed context window around the observed deletion, 0-based half-open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    start: usize,
    end: usize,
}

impl Window {
    /// Bases left over after removing the 0-based half-open span
    /// `del_start..del_end` from the window, as (left flank, right flank).
    fn flanks<'a>(&self, bases: &'a [u8], del_start: usize, del_end: usize) -> (&'a [u8], &'a [u8]) {
        (slice(bases, self.start, del_start), slice(bases, del_end, self.end))
    }
}

/// `bases[from..to]`, or empty when the range is inverted
fn slice(bases: &[u8], from: usize, to: usize) -> &[u8] {
    if from < to {
        &bases[from..to]
    } else {
        &[]
    }
}

/// Whether a deletion of `length` bases ending at 1-based position `end`
/// could equally have been placed elsewhere.
///
/// Returns `false` for an empty deletion or an `end` outside the reference.
#[must_use]
pub fn is_ambiguous(
    reference: &ReferenceSequence,
    end: usize,
    length: usize,
    surrounding: usize,
) -> bool {
    let bases = reference.as_bytes();
    let n = bases.len();
    if length == 0 || !reference.contains(end) {
        return false;
    }

    // 0-based half-open: deleted span is del_start..end
    let del_start = end.saturating_sub(length);
    let window = Window {
        start: del_start.saturating_sub(surrounding),
        end: end.saturating_add(surrounding).min(n),
    };

    let (left, right) = window.flanks(bases, del_start, end);

    // Alternate 1-based ends within `length` of the observed one, whose start
    // (alt_end - length + 1) is at least 1 and whose end is inside the reference
    let first = end.saturating_sub(length).max(length);
    let last = end.saturating_add(length).min(n);

    (first..=last)
        .filter(|&alt_end| alt_end != end)
        .any(|alt_end| {
            let (alt_left, alt_right) = window.flanks(bases, alt_end - length, alt_end);
            left.iter().chain(right).eq(alt_left.iter().chain(alt_right))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ambiguous(reference: &str, end: usize, length: usize, surrounding: usize) -> bool {
        is_ambiguous(&ReferenceSequence::new("ref", reference), end, length, surrounding)
    }

    #[test]
    fn test_homopolymer_is_ambiguous() {
        // Deleting any one of the A's yields the same read
        assert!(ambiguous("GCGAAAAACGC", 6, 1, 10));
        assert!(ambiguous("GCGAAAAACGC", 4, 1, 10));
        assert!(ambiguous("GCGAAAAACGC", 8, 1, 10));
    }

    #[test]
    fn test_tandem_repeat_is_ambiguous() {
        // "CAG" repeated; deleting one unit anywhere gives the same context
        assert!(ambiguous("TTCAGCAGCAGTT", 8, 3, 10));
        assert!(ambiguous("TTCAGCAGCAGTT", 5, 3, 10));
    }

    #[test]
    fn test_unique_context_is_not_ambiguous() {
        assert!(!ambiguous("ACGTACGTAC", 6, 1, 10));
        assert!(!ambiguous("GGCATACGGATTCC", 6, 3, 10));
    }

    #[test]
    fn test_single_base_between_different_neighbours() {
        // Only the G at 4 is deleted; neighbours differ so it cannot slide
        assert!(!ambiguous("AACGTTAA", 4, 1, 3));
    }

    #[test]
    fn test_zero_window_is_never_ambiguous() {
        // Any shifted placement leaves part of the observed span inside the
        // (empty) window, so contexts always differ in length
        assert!(!ambiguous("GCGAAAAACGC", 6, 1, 0));
        assert!(ambiguous("GCGAAAAACGC", 6, 1, 1));
    }

    #[test]
    fn test_out_of_range_and_empty() {
        assert!(!ambiguous("AAAA", 0, 1, 10));
        assert!(!ambiguous("AAAA", 5, 1, 10));
        assert!(!ambiguous("AAAA", 2, 0, 10));
        assert!(!ambiguous("", 1, 1, 10));
    }

    #[test]
    fn test_single_base_reference() {
        // No alternate placement exists
        assert!(!ambiguous("A", 1, 1, 10));
    }

    #[test]
    fn test_alternates_never_start_before_position_one() {
        // Deletion of 2 ending at 2 (span 1..=2). The only in-range
        // alternates end at 3 and 4; ends 0 and 1 would start before 1.
        assert!(!ambiguous("ACGTTT", 2, 2, 10));
        assert!(ambiguous("ACACGG", 2, 2, 10));
    }

    // Near the start of the sequence the window would begin before position
    // 1. A port that indexes with the raw negative offset wraps around to the
    // far end of the sequence; the resulting slice is empty, the left flank
    // silently disappears from the comparison, and the flanks of observed and
    // alternate placements no longer line up.
    //
    // Reference GTCACGTTAGCA, deleting "CA" at 3..=4, surrounding 10.
    //   clamped:  observed context = GT + CGTTAGCA; the alternate at 4..=5
    //             ("AC") leaves GT + C + GTTAGCA, identical, so ambiguous.
    //   wrapped:  observed left flank is empty (window start wraps to index
    //             4, past the deletion start 2), while the alternate left
    //             flanks are empty too, leaving right flanks of differing
    //             length; nothing ever compares equal.
    // The clamped answer is the correct one: "GTCACGTTAGCA" minus "CA" at
    // 3..=4 and minus "AC" at 4..=5 are the same read.
    #[test]
    fn test_window_clamps_at_sequence_start_instead_of_wrapping() {
        let reference = "GTCACGTTAGCA";
        let minus_ca: String = [&reference[..2], &reference[4..]].concat();
        let minus_ac: String = [&reference[..3], &reference[5..]].concat();
        assert_eq!(minus_ca, minus_ac);

        assert!(ambiguous(reference, 4, 2, 10));
    }

    // Mirror case at the far end: the window end clamps to N.
    #[test]
    fn test_window_clamps_at_sequence_end() {
        // "ACGGTCAC", deleting "CA" at 6..=7 equals deleting "AC" at 7..=8
        assert!(ambiguous("ACGGTCAC", 7, 2, 10));
        // Unique tail
        assert!(!ambiguous("ACGGTCAG", 7, 2, 10));
    }

    // An observed deletion near position 1 keeps its real left flank.
    // Deleting the C at 2 in "ACGT": alternates end at 1 (delete A -> CGT)
    // and 3 (delete G -> ACT); neither equals AGT.
    #[test]
    fn test_left_flank_near_start_is_kept() {
        assert!(!ambiguous("ACGT", 2, 1, 10));
        assert!(ambiguous("AAGT", 2, 1, 10));
    }
}

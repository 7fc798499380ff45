//! Decoding of run-length alignment operation strings (CIGAR).

use std::fmt;

/// Value of the CIGAR field when no alignment information is available
pub const NO_ALIGNMENT: &str = "*";

/// A CIGAR operation code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `M`: alignment match, base may or may not agree with the reference
    MatchOrMismatch,
    /// `=`: sequence match
    SequenceMatch,
    /// `X`: sequence mismatch
    SequenceMismatch,
    /// `I`: insertion to the reference
    Insertion,
    /// `D`: deletion from the reference
    Deletion,
    /// `N`: skipped region of the reference
    SkippedRegion,
    /// `S`: soft clip, bases present in the read
    SoftClip,
    /// `H`: hard clip, bases absent from the read
    HardClip,
    /// `P`: padding
    Padding,
}

impl Opcode {
    #[must_use]
    pub fn from_symbol(symbol: u8) -> Option<Self> {
        match symbol {
            b'M' => Some(Self::MatchOrMismatch),
            b'=' => Some(Self::SequenceMatch),
            b'X' => Some(Self::SequenceMismatch),
            b'I' => Some(Self::Insertion),
            b'D' => Some(Self::Deletion),
            b'N' => Some(Self::SkippedRegion),
            b'S' => Some(Self::SoftClip),
            b'H' => Some(Self::HardClip),
            b'P' => Some(Self::Padding),
            _ => None,
        }
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::MatchOrMismatch => 'M',
            Self::SequenceMatch => '=',
            Self::SequenceMismatch => 'X',
            Self::Insertion => 'I',
            Self::Deletion => 'D',
            Self::SkippedRegion => 'N',
            Self::SoftClip => 'S',
            Self::HardClip => 'H',
            Self::Padding => 'P',
        }
    }

    /// M, = and X
    #[must_use]
    pub fn is_match(self) -> bool {
        matches!(
            self,
            Self::MatchOrMismatch | Self::SequenceMatch | Self::SequenceMismatch
        )
    }

    /// D and N
    #[must_use]
    pub fn is_deletion(self) -> bool {
        matches!(self, Self::Deletion | Self::SkippedRegion)
    }

    #[must_use]
    pub fn consumes_reference(self) -> bool {
        self.is_match() || self.is_deletion()
    }

    #[must_use]
    pub fn consumes_read(self) -> bool {
        self.is_match() || matches!(self, Self::Insertion | Self::SoftClip)
    }
}

/// One decoded run: `length` repetitions of `opcode`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentOp {
    pub length: usize,
    pub opcode: Opcode,
}

impl AlignmentOp {
    #[must_use]
    pub fn new(length: usize, opcode: Opcode) -> Self {
        Self { length, opcode }
    }
}

impl fmt::Display for AlignmentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.opcode.symbol())
    }
}

/// Decode a CIGAR string into its runs.
///
/// Never fails. The `*` sentinel and empty input decode to nothing. A run is
/// kept only when it is a non-empty digit string directly followed by a known
/// operation letter; zero-length runs, runs whose count overflows, and
/// anything else (unknown letters, stray characters, letters with no count)
/// are dropped, so malformed input degrades to a partial decode.
#[must_use]
pub fn decode(cigar: &str) -> Vec<AlignmentOp> {
    let mut ops = Vec::new();
    if cigar.is_empty() || cigar == NO_ALIGNMENT {
        return ops;
    }

    // None: no digits pending. Some(None): digits pending but overflowed.
    let mut pending: Option<Option<usize>> = None;

    for &byte in cigar.as_bytes() {
        if byte.is_ascii_digit() {
            let digit = usize::from(byte - b'0');
            let count = pending.unwrap_or(Some(0));
            pending = Some(count.and_then(|n| n.checked_mul(10)?.checked_add(digit)));
            continue;
        }

        if let (Some(Some(length)), Some(opcode)) = (pending, Opcode::from_symbol(byte)) {
            if length > 0 {
                ops.push(AlignmentOp::new(length, opcode));
            }
        }
        pending = None;
    }

    ops
}

use std::fmt;

/// Outcome of classifying one reference position from a read (or a merged fragment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionCall {
    /// Read base agrees with the reference base
    NoMutation,
    /// Reference base is absent from the read
    Deletion,
    /// Position lies under a trailing soft clip; the read says nothing about it
    Missing,
    /// Low-quality base, or a deletion that cannot be placed unambiguously
    Ambiguous,
    /// Read carries a different base than the reference
    Substitution(u8),
}

impl PositionCall {
    pub const NO_MUTATION_SYMBOL: char = '0';
    pub const DELETION_SYMBOL: char = '1';
    pub const MISSING_SYMBOL: char = '*';
    pub const AMBIGUOUS_SYMBOL: char = '?';

    /// Single-character symbol used in bit-vector text output.
    ///
    /// Substitutions render as the observed base, so a dense bit string reads
    /// e.g. `00?0A01**`.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::NoMutation => Self::NO_MUTATION_SYMBOL,
            Self::Deletion => Self::DELETION_SYMBOL,
            Self::Missing => Self::MISSING_SYMBOL,
            Self::Ambiguous => Self::AMBIGUOUS_SYMBOL,
            Self::Substitution(base) => char::from(base),
        }
    }

    /// True for substitutions, the calls counted as mutations per read
    #[must_use]
    pub fn is_mutation(self) -> bool {
        matches!(self, Self::Substitution(_))
    }
}

impl fmt::Display for PositionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

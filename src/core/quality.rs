//! Quality character to score lookup.

/// Offset of Sanger / Illumina 1.8+ quality encoding
pub const PHRED33_OFFSET: u8 = b'!';

/// Highest printable quality character
const MAX_QUALITY_CHAR: u8 = b'~';

/// Mapping from quality character to integer score.
///
/// Characters without an entry score 0, which is always at or below any
/// sensible cutoff, so unknown characters force an ambiguous call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityTable {
    scores: [i32; 256],
}

impl QualityTable {
    /// A table with no entries
    #[must_use]
    pub fn empty() -> Self {
        Self { scores: [0; 256] }
    }

    /// Standard Phred+33 table: `'!'` scores 0 through `'~'` scoring 93
    #[must_use]
    pub fn phred33() -> Self {
        Self::with_offset(PHRED33_OFFSET)
    }

    /// Table for an ASCII offset encoding; characters `offset..='~'` score
    /// `0, 1, 2, ...`
    #[must_use]
    pub fn with_offset(offset: u8) -> Self {
        (offset..=MAX_QUALITY_CHAR)
            .map(|symbol| (symbol, i32::from(symbol - offset)))
            .collect()
    }

    pub fn insert(&mut self, symbol: u8, score: i32) {
        self.scores[usize::from(symbol)] = score;
    }

    /// Score for a quality character; 0 for unknown characters
    #[inline]
    #[must_use]
    pub fn score(&self, symbol: u8) -> i32 {
        self.scores[usize::from(symbol)]
    }
}

impl Default for QualityTable {
    fn default() -> Self {
        Self::phred33()
    }
}

impl FromIterator<(u8, i32)> for QualityTable {
    fn from_iter<T: IntoIterator<Item = (u8, i32)>>(iter: T) -> Self {
        let mut table = Self::empty();
        for (symbol, score) in iter {
            table.insert(symbol, score);
        }
        table
    }
}

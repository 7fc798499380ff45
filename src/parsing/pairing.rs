//! Grouping consecutive SAM records into fragments.

use std::iter::Peekable;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::read::AlignedRead;
use crate::parsing::sam::SamRecord;

/// How records are grouped into fragments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingMode {
    /// Pair records flagged as segmented whose mate is mapped
    #[default]
    Auto,
    /// Every record is its own fragment
    Single,
    /// Every record must pair with the record after it
    Paired,
}

/// One unit of classification: a single read or both mates of a pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Single(SamRecord),
    Paired(SamRecord, SamRecord),
}

impl Fragment {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Single(record) | Self::Paired(record, _) => &record.read.name,
        }
    }

    #[must_use]
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            Self::Single(record) | Self::Paired(record, _) => record.reference_name.as_deref(),
        }
    }

    /// First mate, then the second if paired
    pub fn reads(&self) -> impl Iterator<Item = &AlignedRead> {
        let (first, second) = match self {
            Self::Single(record) => (record, None),
            Self::Paired(first, second) => (first, Some(second)),
        };
        std::iter::once(&first.read).chain(second.map(|record| &record.read))
    }

    /// Lowest mapping quality over the mates; `None` if any is unavailable
    #[must_use]
    pub fn mapping_quality(&self) -> Option<u8> {
        match self {
            Self::Single(record) => record.mapping_quality,
            Self::Paired(first, second) => first.mapping_quality.min(second.mapping_quality),
        }
    }
}

/// Whether `second` is the mate of `first`.
///
/// Mates share a name, a reference and a mapping quality, and the first
/// record's mate position is the second record's position.
#[must_use]
pub fn are_mates(first: &SamRecord, second: &SamRecord) -> bool {
    first.read.name == second.read.name
        && first.reference_name.is_some()
        && first.reference_name == second.reference_name
        && first.mate_reference_name == first.reference_name
        && first.mate_position == Some(second.read.position)
        && first.mapping_quality == second.mapping_quality
}

/// Iterator adapter turning a record stream into fragments.
///
/// Records that need a mate but are not followed by a consistent one are
/// dropped with a warning and counted in [`Fragments::unpaired`].
pub struct Fragments<I: Iterator<Item = SamRecord>> {
    records: Peekable<I>,
    mode: PairingMode,
    unpaired: usize,
}

impl<I: Iterator<Item = SamRecord>> Fragments<I> {
    pub fn new(records: I, mode: PairingMode) -> Self {
        Self {
            records: records.peekable(),
            mode,
            unpaired: 0,
        }
    }

    /// Number of records dropped for lack of a mate so far
    #[must_use]
    pub fn unpaired(&self) -> usize {
        self.unpaired
    }
}

impl<I: Iterator<Item = SamRecord>> Iterator for Fragments<I> {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        loop {
            let first = self.records.next()?;

            let wants_mate = match self.mode {
                PairingMode::Single => false,
                PairingMode::Paired => true,
                PairingMode::Auto => first.is_segmented && !first.is_mate_unmapped,
            };
            if !wants_mate {
                return Some(Fragment::Single(first));
            }

            if let Some(second) = self.records.next_if(|next| are_mates(&first, next)) {
                return Some(Fragment::Paired(first, second));
            }

            warn!(read = %first.read.name, "No consistent mate follows record, skipping");
            self.unpaired += 1;
        }
    }
}

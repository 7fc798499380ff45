//! Acceptance checks applied to a fragment once its calls are known.
//!
//! Low mapping quality is always checked by the driver; the stricter
//! constraints (short reads, too many substitutions, substitutions too close
//! together) apply only when enabled.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::bitvector::BitVector;
use crate::core::read::AlignedRead;
use crate::core::reference::ReferenceSequence;

/// Default minimum spacing between two substitutions
pub const DEFAULT_MIN_MUT_DISTANCE: usize = 5;

/// Default minimum read length, as a fraction of the reference length
pub const DEFAULT_PERCENT_LENGTH_CUTOFF: f64 = 0.10;

/// Default maximum number of substitutions
pub const DEFAULT_MUTATION_COUNT_CUTOFF: usize = 5;

/// Why a classified fragment was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// A mate maps below the minimum mapping quality
    LowMapq,
    /// A mate covers too small a fraction of the reference
    ShortRead,
    /// More substitutions than allowed
    TooManyMutations,
    /// Two substitutions within the minimum distance of each other
    MutationsTooClose,
}

impl RejectReason {
    /// Label used in logs and the rejected-fragment file
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowMapq => "low_mapq",
            Self::ShortRead => "short_read",
            Self::TooManyMutations => "too_many_muts",
            Self::MutationsTooClose => "muts_too_close",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional per-fragment constraints, disabled by default
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StricterConstraints {
    pub enabled: bool,

    /// Substitutions this close (in reference positions) or closer reject the fragment
    pub min_mut_distance: usize,

    /// Every mate must have at least this fraction of the reference length in bases
    pub percent_length_cutoff: f64,

    /// Fragments with more substitutions than this are rejected
    pub mutation_count_cutoff: usize,
}

impl Default for StricterConstraints {
    fn default() -> Self {
        Self {
            enabled: false,
            min_mut_distance: DEFAULT_MIN_MUT_DISTANCE,
            percent_length_cutoff: DEFAULT_PERCENT_LENGTH_CUTOFF,
            mutation_count_cutoff: DEFAULT_MUTATION_COUNT_CUTOFF,
        }
    }
}

impl StricterConstraints {
    /// First constraint the fragment violates, checked in the order short
    /// read, mutation count, mutation spacing. `None` when disabled.
    #[must_use]
    pub fn check<'a>(
        &self,
        reads: impl IntoIterator<Item = &'a AlignedRead>,
        reference: &ReferenceSequence,
        calls: &BitVector,
    ) -> Option<RejectReason> {
        if !self.enabled {
            return None;
        }

        let min_bases = self.percent_length_cutoff * count_to_f64(reference.len());
        if reads
            .into_iter()
            .any(|read| count_to_f64(read.bases.len()) < min_bases)
        {
            return Some(RejectReason::ShortRead);
        }

        if calls.mutation_count() > self.mutation_count_cutoff {
            return Some(RejectReason::TooManyMutations);
        }

        if self.mutations_too_close(calls) {
            return Some(RejectReason::MutationsTooClose);
        }

        None
    }

    /// Positions iterate in order, so the closest pair is always adjacent
    fn mutations_too_close(&self, calls: &BitVector) -> bool {
        let mut previous: Option<usize> = None;
        for (pos, call) in calls.iter() {
            if !call.is_mutation() {
                continue;
            }
            if previous.is_some_and(|prev| pos - prev <= self.min_mut_distance) {
                return true;
            }
            previous = Some(pos);
        }
        false
    }
}

#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

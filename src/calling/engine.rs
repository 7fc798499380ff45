use serde::{Deserialize, Serialize};

use crate::calling::deletion;
use crate::calling::merge::merge_mates;
use crate::calling::walk::{classify_read, WalkContext};
use crate::core::bitvector::BitVector;
use crate::core::quality::QualityTable;
use crate::core::read::AlignedRead;
use crate::core::reference::ReferenceSequence;

/// Default quality score cutoff; bases scoring at or below it are ambiguous
pub const DEFAULT_QUALITY_CUTOFF: i32 = 25;

/// Default number of bases compared on each side of a deletion
pub const DEFAULT_SURROUNDING_BASES: usize = 10;

/// Configuration for per-position classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Bases with a quality score at or below this value are called ambiguous
    pub quality_cutoff: i32,
    /// Half-width of the context window used to test deletion ambiguity
    pub surrounding_bases: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            quality_cutoff: DEFAULT_QUALITY_CUTOFF,
            surrounding_bases: DEFAULT_SURROUNDING_BASES,
        }
    }
}

/// Classify every covered position of a single read
#[must_use]
pub fn classify_single(
    read: &AlignedRead,
    reference: &ReferenceSequence,
    qualities: &QualityTable,
    config: &ClassifierConfig,
) -> BitVector {
    classify_read(&WalkContext {
        read,
        reference,
        qualities,
        config,
    })
}

/// Classify both mates of a fragment and merge them into one call set
#[must_use]
pub fn classify_paired(
    first: &AlignedRead,
    second: &AlignedRead,
    reference: &ReferenceSequence,
    qualities: &QualityTable,
    config: &ClassifierConfig,
) -> BitVector {
    let first_calls = classify_single(first, reference, qualities, config);
    let second_calls = classify_single(second, reference, qualities, config);
    merge_mates(&first_calls, &second_calls)
}

/// Entry point for classifying reads against a reference.
///
/// The engine holds only its configuration, so one instance can be shared
/// across threads and used for any number of reads.
#[derive(Debug, Clone, Default)]
pub struct BitVectorEngine {
    config: ClassifierConfig,
}

impl BitVectorEngine {
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    #[must_use]
    pub fn classify_single(
        &self,
        read: &AlignedRead,
        reference: &ReferenceSequence,
        qualities: &QualityTable,
    ) -> BitVector {
        classify_single(read, reference, qualities, &self.config)
    }

    #[must_use]
    pub fn classify_paired(
        &self,
        first: &AlignedRead,
        second: &AlignedRead,
        reference: &ReferenceSequence,
        qualities: &QualityTable,
    ) -> BitVector {
        classify_paired(first, second, reference, qualities, &self.config)
    }

    /// Whether a deletion of `length` bases ending at 1-based `end` could be
    /// placed elsewhere, using the configured context window
    #[must_use]
    pub fn is_deletion_ambiguous(
        &self,
        reference: &ReferenceSequence,
        end: usize,
        length: usize,
    ) -> bool {
        deletion::is_ambiguous(reference, end, length, self.config.surrounding_bases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PositionCall;

    fn reference() -> ReferenceSequence {
        ReferenceSequence::new("ref", "ACGTACGTAC")
    }

    #[test]
    fn test_default_config() {
        let config = ClassifierConfig::default();
        assert_eq!(config.quality_cutoff, 25);
        assert_eq!(config.surrounding_bases, 10);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: ClassifierConfig = serde_json::from_str(r#"{"quality_cutoff": 30}"#).unwrap();
        assert_eq!(config.quality_cutoff, 30);
        assert_eq!(config.surrounding_bases, DEFAULT_SURROUNDING_BASES);
    }

    #[test]
    fn test_single_deletion_end_to_end() {
        let engine = BitVectorEngine::default();
        let read = AlignedRead::new("r1", 1, "ACGTAGTAC", "IIIIIIIII", "5M1D4M");
        let calls = engine.classify_single(&read, &reference(), &QualityTable::phred33());

        assert_eq!(calls.len(), 10);
        assert_eq!(calls.get(6), Some(PositionCall::Deletion));
        for pos in (1..=5).chain(7..=10) {
            assert_eq!(calls.get(pos), Some(PositionCall::NoMutation), "position {pos}");
        }
    }

    #[test]
    fn test_classification_is_idempotent() {
        let engine = BitVectorEngine::default();
        let read = AlignedRead::new("r1", 2, "CGAACGTNNN", "II#IIIIIII", "2M1I4M3S");
        let qualities = QualityTable::phred33();

        let first = engine.classify_single(&read, &reference(), &qualities);
        let second = engine.classify_single(&read, &reference(), &qualities);
        assert_eq!(first, second);
    }

    #[test]
    fn test_coverage_bound() {
        // 6 reference positions consumed plus a trailing 3-base soft clip
        let engine = BitVectorEngine::default();
        let read = AlignedRead::new("r1", 1, "ACGCGTNNN", "IIIIIIIII", "3M1D3M3S");
        let calls = engine.classify_single(&read, &reference(), &QualityTable::phred33());
        assert!(calls.len() <= 7 + 3);
        assert_eq!(calls.count(PositionCall::Missing), 3);
    }

    #[test]
    fn test_quality_gating() {
        let config = ClassifierConfig {
            quality_cutoff: 30,
            ..ClassifierConfig::default()
        };
        let engine = BitVectorEngine::new(config);
        // Mismatch at position 3 with Q30 (= cutoff) is not a substitution
        let read = AlignedRead::new("r1", 1, "ACATA", "II?II", "5M");
        let calls = engine.classify_single(&read, &reference(), &QualityTable::phred33());
        assert_eq!(calls.get(3), Some(PositionCall::Ambiguous));
        assert_eq!(calls.mutation_count(), 0);

        let engine = BitVectorEngine::default();
        let calls = engine.classify_single(&read, &reference(), &QualityTable::phred33());
        assert_eq!(calls.get(3), Some(PositionCall::Substitution(b'A')));
    }

    #[test]
    fn test_soft_clip_asymmetry() {
        let engine = BitVectorEngine::default();
        let qualities = QualityTable::phred33();

        let leading = AlignedRead::new("r1", 1, "NNNNNACGTA", "IIIIIIIIII", "5S5M");
        let calls = engine.classify_single(&leading, &reference(), &qualities);
        assert_eq!(calls.count(PositionCall::Missing), 0);

        let trailing = AlignedRead::new("r1", 1, "ACGTANNNNN", "IIIIIIIIII", "5M5S");
        let calls = engine.classify_single(&trailing, &reference(), &qualities);
        assert_eq!(calls.count(PositionCall::Missing), 5);
        assert!((6..=10).all(|pos| calls.get(pos) == Some(PositionCall::Missing)));
    }

    #[test]
    fn test_paired_merges_mates() {
        let engine = BitVectorEngine::default();
        let qualities = QualityTable::phred33();
        // Mate 1 covers 1..=6 with a substitution at 5; mate 2 covers 4..=10
        // and reads the reference base at 5
        let first = AlignedRead::new("frag", 1, "ACGTTC", "IIIIII", "6M");
        let second = AlignedRead::new("frag", 4, "TACGTAC", "IIIIIII", "7M");

        let calls = engine.classify_paired(&first, &second, &reference(), &qualities);
        assert_eq!(calls.len(), 10);
        assert_eq!(calls.get(5), Some(PositionCall::NoMutation));
        assert_eq!(calls.mutation_count(), 0);
    }

    #[test]
    fn test_deletion_ambiguity_uses_configured_window() {
        let reference = ReferenceSequence::new("ref", "GCGAAAAACGC");
        assert!(BitVectorEngine::default().is_deletion_ambiguous(&reference, 6, 1));

        let narrow = BitVectorEngine::new(ClassifierConfig {
            surrounding_bases: 0,
            ..ClassifierConfig::default()
        });
        assert!(!narrow.is_deletion_ambiguous(&reference, 6, 1));
    }

    #[test]
    fn test_malformed_cigar_yields_empty() {
        let engine = BitVectorEngine::default();
        let read = AlignedRead::new("r1", 1, "ACGTA", "IIIII", "*");
        let calls = engine.classify_single(&read, &reference(), &QualityTable::phred33());
        assert!(calls.is_empty());
    }

    #[test]
    fn test_engine_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BitVectorEngine>();

        let engine = BitVectorEngine::default();
        let reference = reference();
        let qualities = QualityTable::phred33();
        let read = AlignedRead::new("r1", 1, "ACGAAGTAC", "IIIIIIIII", "5M1D4M");
        let expected = engine.classify_single(&read, &reference, &qualities);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| engine.classify_single(&read, &reference, &qualities)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}

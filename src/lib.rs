//! # rna-bitvector
//!
//! A library for turning aligned sequencing reads into per-position mutation
//! calls ("bit vectors") for mutational-profiling experiments.
//!
//! Chemical probes such as DMS modify RNA nucleotides; reverse transcription
//! records those modifications as substitutions and deletions in the reads.
//! For every reference position a read covers, `rna-bitvector` decides whether
//! the read shows a match, a substitution, a deletion, or nothing conclusive,
//! and merges the two mates of a paired fragment into one call set.
//!
//! ## Features
//!
//! - **Quality gating**: bases at or below a quality cutoff are ambiguous
//! - **Deletion placement**: deletions in repeats that could slide are ambiguous
//! - **Mate merging**: fixed-priority resolution of disagreeing mates
//! - **Pure core**: classification performs no I/O and can run on any thread
//!
//! ## Example
//!
//! ```rust
//! use rna_bitvector::{AlignedRead, BitVectorEngine, PositionCall, QualityTable, ReferenceSequence};
//!
//! let reference = ReferenceSequence::new("rna1", "ACGTACGTAC");
//! let read = AlignedRead::new("read1", 1, "ACGTAGTAC", "IIIIIIIII", "5M1D4M");
//!
//! let engine = BitVectorEngine::default();
//! let calls = engine.classify_single(&read, &reference, &QualityTable::phred33());
//!
//! assert_eq!(calls.get(6), Some(PositionCall::Deletion));
//! assert_eq!(calls.to_bit_string(1, 10), "0000010000");
//! ```
//!
//! ## Modules
//!
//! - [`calling`]: CIGAR decoding, per-read classification, deletion ambiguity, mate merging
//! - [`core`]: Core data types for references, reads, quality tables and calls
//! - [`parsing`]: Parsers for SAM, FASTA and quality-table files
//! - [`output`]: Bit vector writers
//! - [`cli`]: Command-line interface implementation

pub mod calling;
pub mod cli;
pub mod core;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use calling::engine::{classify_paired, classify_single, BitVectorEngine, ClassifierConfig};
pub use core::bitvector::BitVector;
pub use core::quality::QualityTable;
pub use core::read::AlignedRead;
pub use core::reference::{ReferenceSequence, ReferenceSet};
pub use core::types::*;

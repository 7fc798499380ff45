//! Core data types for per-position mutation calling.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`ReferenceSequence`]: A named, 1-based reference sequence
//! - [`AlignedRead`]: An already-parsed aligned read (bases, qualities, CIGAR)
//! - [`QualityTable`]: Quality character to score lookup
//! - [`PositionCall`]: The call made for one reference position
//! - [`BitVector`]: Sparse position → call map for a read or fragment
//!
//! ## Symbols
//!
//! Bit vectors are written with one symbol per reference position:
//!
//! | Call         | Symbol |
//! |--------------|--------|
//! | No mutation  | `0`    |
//! | Deletion     | `1`    |
//! | Missing      | `*`    |
//! | Ambiguous    | `?`    |
//! | Substitution | the observed base |
//! | Not covered  | `.`    |
//!
//! [`ReferenceSequence`]: reference::ReferenceSequence
//! [`AlignedRead`]: read::AlignedRead
//! [`QualityTable`]: quality::QualityTable
//! [`PositionCall`]: types::PositionCall
//! [`BitVector`]: bitvector::BitVector

pub mod bitvector;
pub mod quality;
pub mod read;
pub mod reference;
pub mod types;

//! Parsers for the files the command-line driver consumes.
//!
//! This module provides parsers for:
//!
//! - **SAM files**: alignment records reduced to [`SamRecord`](sam::SamRecord)
//! - **FASTA files**: reference sequences, plain or gzip compressed
//! - **Quality tables**: `score symbol` files mapping quality characters to scores
//!
//! [`pairing`] groups the SAM record stream into single-read and mate-pair
//! fragments.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rna_bitvector::parsing::fasta::parse_fasta_file;
//! use rna_bitvector::parsing::sam::SamReader;
//! use std::path::Path;
//!
//! let references = parse_fasta_file(Path::new("ref.fa")).unwrap();
//! let mut reader = SamReader::open(Path::new("aligned.sam")).unwrap();
//! for record in reader.records() {
//!     let record = record.unwrap();
//!     let reference = record
//!         .reference_name
//!         .as_deref()
//!         .and_then(|name| references.get(name));
//!     println!("{} -> {:?}", record.read.name, reference.map(|r| r.name()));
//! }
//! ```

pub mod fasta;
pub mod pairing;
pub mod qscores;
pub mod sam;

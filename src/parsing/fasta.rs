//! Reference loading from FASTA files using noodles.
//!
//! Supports both uncompressed and gzip/bgzip compressed files; compression is
//! detected from the `.gz` / `.bgz` extension. Every member of a multi-member
//! gzip stream is read, which covers bgzip blocks. Bases are uppercased on load so
//! they compare directly against read bases.

use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::core::reference::{ReferenceSequence, ReferenceSet};
use crate::parsing::sam::ParseError;
use crate::utils::validation::check_reference_limit;

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Load every sequence of a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, `ParseError::InvalidFormat` if no sequences are found, or
/// `ParseError::TooManyReferences` if the limit is exceeded.
pub fn parse_fasta_file(path: &Path) -> Result<ReferenceSet, ParseError> {
    let file = std::fs::File::open(path)?;

    if is_gzipped(path) {
        read_fasta(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        read_fasta(BufReader::new(file))
    }
}

/// Load every sequence from a buffered FASTA source.
///
/// # Errors
///
/// See [`parse_fasta_file`].
pub fn read_fasta<R: BufRead>(reader: R) -> Result<ReferenceSet, ParseError> {
    let mut fasta_reader = fasta::io::Reader::new(reader);
    let mut references = ReferenceSet::new();

    for result in fasta_reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        // Check reference limit for DOS protection
        if check_reference_limit(references.len()).is_some() {
            return Err(ParseError::TooManyReferences(references.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let bases: Vec<u8> = record
            .sequence()
            .as_ref()
            .iter()
            .map(u8::to_ascii_uppercase)
            .collect();

        references.push(ReferenceSequence::new(name, bases));
    }

    if references.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(references)
}

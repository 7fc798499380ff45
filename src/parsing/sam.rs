use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use noodles::sam;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record_buf::RecordBuf;
use thiserror::Error;

use crate::calling::cigar::{AlignmentOp, Opcode, NO_ALIGNMENT};
use crate::core::quality::PHRED33_OFFSET;
use crate::core::read::AlignedRead;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid SAM record: {0}")]
    InvalidRecord(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Too many references: {0} exceeds maximum allowed (100000)")]
    TooManyReferences(usize),
}

/// One alignment record, reduced to what classification and pairing need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamRecord {
    pub read: AlignedRead,

    /// Name of the reference the read aligns to
    pub reference_name: Option<String>,

    /// Mapping quality; `None` when unavailable (255)
    pub mapping_quality: Option<u8>,

    /// Reference of the mate; equal to `reference_name` for `=`
    pub mate_reference_name: Option<String>,

    /// 1-based position of the mate
    pub mate_position: Option<usize>,

    pub is_unmapped: bool,
    pub is_secondary: bool,
    pub is_supplementary: bool,
    pub is_segmented: bool,
    pub is_mate_unmapped: bool,
}

impl SamRecord {
    /// Primary, mapped alignments are the only ones classified
    #[must_use]
    pub fn is_primary_mapped(&self) -> bool {
        !(self.is_unmapped || self.is_secondary || self.is_supplementary)
    }

    fn from_record_buf(record: &RecordBuf, header: &sam::Header) -> Self {
        let flags = record.flags();

        let name = record
            .name()
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        let position = record.alignment_start().map_or(0, usize::from);
        let bases: Vec<u8> = record
            .sequence()
            .as_ref()
            .iter()
            .map(u8::to_ascii_uppercase)
            .collect();
        // Decoded Phred scores go back to Phred+33 characters so that any
        // quality table keyed by character applies
        let qualities: Vec<u8> = record
            .quality_scores()
            .as_ref()
            .iter()
            .map(|&q| q.saturating_add(PHRED33_OFFSET))
            .collect();

        Self {
            read: AlignedRead::new(name, position, bases, qualities, cigar_text(record)),
            reference_name: reference_name(header, record.reference_sequence_id()),
            mapping_quality: record.mapping_quality().map(|q| q.get()),
            mate_reference_name: reference_name(header, record.mate_reference_sequence_id()),
            mate_position: record.mate_alignment_start().map(usize::from),
            is_unmapped: flags.is_unmapped(),
            is_secondary: flags.is_secondary(),
            is_supplementary: flags.is_supplementary(),
            is_segmented: flags.is_segmented(),
            is_mate_unmapped: flags.is_mate_unmapped(),
        }
    }
}

fn reference_name(header: &sam::Header, id: Option<usize>) -> Option<String> {
    id.and_then(|id| {
        header
            .reference_sequences()
            .get_index(id)
            .map(|(name, _)| name.to_string())
    })
}

fn opcode(kind: Kind) -> Opcode {
    match kind {
        Kind::Match => Opcode::MatchOrMismatch,
        Kind::Insertion => Opcode::Insertion,
        Kind::Deletion => Opcode::Deletion,
        Kind::Skip => Opcode::SkippedRegion,
        Kind::SoftClip => Opcode::SoftClip,
        Kind::HardClip => Opcode::HardClip,
        Kind::Pad => Opcode::Padding,
        Kind::SequenceMatch => Opcode::SequenceMatch,
        Kind::SequenceMismatch => Opcode::SequenceMismatch,
    }
}

/// CIGAR back to its text form, `*` when empty
fn cigar_text(record: &RecordBuf) -> String {
    let ops: String = record
        .cigar()
        .as_ref()
        .iter()
        .map(|op| AlignmentOp::new(op.len(), opcode(op.kind())).to_string())
        .collect();

    if ops.is_empty() {
        NO_ALIGNMENT.to_string()
    } else {
        ops
    }
}

/// Streaming SAM reader yielding [`SamRecord`]s
pub struct SamReader<R> {
    reader: sam::io::Reader<R>,
    header: sam::Header,
}

impl SamReader<Box<dyn BufRead>> {
    /// Open a SAM file and read its header
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be opened or
    /// `ParseError::Noodles` if the header is malformed.
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let file = File::open(path)?;
        Self::new(Box::new(BufReader::new(file)))
    }
}

impl<R: BufRead> SamReader<R> {
    /// Wrap a buffered SAM source and read its header
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Noodles` if the header is malformed.
    pub fn new(inner: R) -> Result<Self, ParseError> {
        let mut reader = sam::io::Reader::new(inner);
        let header = reader
            .read_header()
            .map_err(|e| ParseError::Noodles(e.to_string()))?;

        Ok(Self { reader, header })
    }

    #[must_use]
    pub fn header(&self) -> &sam::Header {
        &self.header
    }

    /// Iterate over the remaining records.
    ///
    /// A record that fails to parse yields `ParseError::InvalidRecord` and
    /// iteration can continue past it; any other error is an I/O failure.
    pub fn records(&mut self) -> impl Iterator<Item = Result<SamRecord, ParseError>> + '_ {
        let header = &self.header;
        self.reader.record_bufs(header).map(move |result| match result {
            Ok(record) => Ok(SamRecord::from_record_buf(&record, header)),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Err(ParseError::InvalidRecord(e.to_string()))
            }
            Err(e) => Err(ParseError::Io(e)),
        })
    }
}

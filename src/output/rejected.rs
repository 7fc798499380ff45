//! CSV log of fragments that were classified but not written.

use std::borrow::Cow;
use std::io::{self, Write};

use serde::Serialize;

use crate::calling::filter::RejectReason;
use crate::core::bitvector::BitVector;
use crate::core::read::AlignedRead;
use crate::core::reference::ReferenceSequence;

const HEADER: [&str; 6] = ["qname", "rname", "reason", "read1", "read2", "bitvector"];

#[derive(Serialize)]
struct RejectedRecord<'a> {
    qname: &'a str,
    rname: &'a str,
    reason: &'static str,
    read1: Cow<'a, str>,
    read2: Cow<'a, str>,
    bitvector: String,
}

/// Writes one CSV row per rejected fragment: names, reason, the read
/// sequences (`read2` empty for single reads) and the dense bit string.
pub struct RejectedWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> RejectedWriter<W> {
    /// Create the writer and emit the header row
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be written.
    pub fn new(out: W) -> csv::Result<Self> {
        let mut inner = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);
        inner.write_record(HEADER)?;
        Ok(Self { inner })
    }

    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    pub fn write(
        &mut self,
        query_name: &str,
        reference: &ReferenceSequence,
        reason: RejectReason,
        first: &AlignedRead,
        second: Option<&AlignedRead>,
        calls: &BitVector,
    ) -> csv::Result<()> {
        self.inner.serialize(RejectedRecord {
            qname: query_name,
            rname: reference.name(),
            reason: reason.as_str(),
            read1: String::from_utf8_lossy(&first.bases),
            read2: second.map_or(Cow::Borrowed(""), |read| String::from_utf8_lossy(&read.bases)),
            bitvector: calls.to_bit_string(1, reference.len()),
        })
    }

    /// Flush and return the underlying writer
    ///
    /// # Errors
    ///
    /// Returns any error from flushing.
    pub fn finish(self) -> io::Result<W> {
        self.inner.into_inner().map_err(csv::IntoInnerError::into_error)
    }
}

/// An already-parsed aligned read, as the classifier sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRead {
    /// Read (query template) name
    pub name: String,

    /// 1-based leftmost mapped reference position (0 when unknown)
    pub position: usize,

    /// Read bases, in alignment orientation
    pub bases: Vec<u8>,

    /// Quality characters, parallel to `bases`
    pub qualities: Vec<u8>,

    /// Run-length alignment operations (CIGAR text), `*` when absent
    pub cigar: String,
}

impl AlignedRead {
    pub fn new(
        name: impl Into<String>,
        position: usize,
        bases: impl Into<Vec<u8>>,
        qualities: impl Into<Vec<u8>>,
        cigar: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            bases: bases.into(),
            qualities: qualities.into(),
            cigar: cigar.into(),
        }
    }

    /// Number of read positions with both a base and a quality character
    #[must_use]
    pub fn available_len(&self) -> usize {
        self.bases.len().min(self.qualities.len())
    }
}

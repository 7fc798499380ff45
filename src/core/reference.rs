use std::collections::HashMap;

/// An immutable reference sequence with 1-based addressable positions `1..=len()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSequence {
    name: String,
    bases: Vec<u8>,
}

impl ReferenceSequence {
    pub fn new(name: impl Into<String>, bases: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bases: bases.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// All bases, 0-based
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bases
    }

    /// True if `position` is a valid 1-based position
    #[must_use]
    pub fn contains(&self, position: usize) -> bool {
        position >= 1 && position <= self.bases.len()
    }

    /// Base at a 1-based position, or `None` outside `[1, len]`
    #[must_use]
    pub fn base_at(&self, position: usize) -> Option<u8> {
        position
            .checked_sub(1)
            .and_then(|idx| self.bases.get(idx))
            .copied()
    }
}

/// Named reference sequences, in input order, with lookup by name
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    sequences: Vec<ReferenceSequence>,
    by_name: HashMap<String, usize>,
}

impl ReferenceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sequence. A later sequence with the same name replaces the
    /// earlier one for lookups.
    pub fn push(&mut self, sequence: ReferenceSequence) {
        self.by_name
            .insert(sequence.name().to_string(), self.sequences.len());
        self.sequences.push(sequence);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReferenceSequence> {
        self.by_name.get(name).map(|&idx| &self.sequences[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceSequence> {
        self.sequences.iter()
    }
}

impl FromIterator<ReferenceSequence> for ReferenceSet {
    fn from_iter<T: IntoIterator<Item = ReferenceSequence>>(iter: T) -> Self {
        let mut set = Self::new();
        for sequence in iter {
            set.push(sequence);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_at_is_one_based() {
        let reference = ReferenceSequence::new("ref", "ACGT");
        assert_eq!(reference.len(), 4);
        assert_eq!(reference.base_at(0), None);
        assert_eq!(reference.base_at(1), Some(b'A'));
        assert_eq!(reference.base_at(4), Some(b'T'));
        assert_eq!(reference.base_at(5), None);
        assert!(!reference.contains(0));
        assert!(reference.contains(4));
        assert!(!reference.contains(5));
    }

    #[test]
    fn test_reference_set_lookup() {
        let set: ReferenceSet = vec![
            ReferenceSequence::new("a", "AAAA"),
            ReferenceSequence::new("b", "CCCC"),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("b").map(ReferenceSequence::as_bytes), Some(&b"CCCC"[..]));
        assert!(set.get("c").is_none());

        let names: Vec<&str> = set.iter().map(ReferenceSequence::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}

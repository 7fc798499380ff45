//! Centralized validation and helper functions.

use crate::core::reference::ReferenceSequence;

/// Maximum number of reference sequences allowed in a single FASTA (DOS protection)
pub const MAX_REFERENCES: usize = 100_000;

/// Check if adding another reference would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new reference.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if check_reference_limit(references.len()).is_some() {
///     return Err(...);
/// }
/// references.push(new_reference); // Safe to add
/// ```
#[must_use]
pub fn check_reference_limit(count: usize) -> Option<String> {
    if count >= MAX_REFERENCES {
        Some(format!(
            "Too many references: adding another would exceed maximum of {MAX_REFERENCES}"
        ))
    } else {
        None
    }
}

/// Input validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Deletion length must be at least 1")]
    EmptyDeletion,
    #[error("Deletion ending at {end} with length {length} does not fit in '{reference}' (length {reference_length})")]
    DeletionOutOfRange {
        reference: String,
        reference_length: usize,
        end: usize,
        length: usize,
    },
    #[error("Data type label must be non-empty and contain no tabs or newlines")]
    InvalidDataType,
}

/// Validate that a deletion of `length` bases ending at 1-based `end` lies
/// entirely within the reference.
///
/// # Errors
///
/// Returns `ValidationError::EmptyDeletion` for a zero length or
/// `ValidationError::DeletionOutOfRange` if any deleted position falls
/// outside `[1, N]`.
pub fn validate_deletion(
    reference: &ReferenceSequence,
    end: usize,
    length: usize,
) -> Result<(), ValidationError> {
    if length == 0 {
        return Err(ValidationError::EmptyDeletion);
    }

    if end < length || !reference.contains(end) {
        return Err(ValidationError::DeletionOutOfRange {
            reference: reference.name().to_string(),
            reference_length: reference.len(),
            end,
            length,
        });
    }

    Ok(())
}

/// The data type label is written into tab-delimited header lines
///
/// # Errors
///
/// Returns `ValidationError::InvalidDataType` if the label is blank or
/// contains a tab, carriage return or newline.
pub fn validate_data_type(label: &str) -> Result<(), ValidationError> {
    if label.trim().is_empty() || label.contains(['\t', '\n', '\r']) {
        return Err(ValidationError::InvalidDataType);
    }
    Ok(())
}

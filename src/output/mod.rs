//! Writing classified bit vectors.
//!
//! Three formats are supported, chosen with the global `--format` flag:
//!
//! - **text**: per-reference blocks with an `@ref` / `@coordinates:` header
//!   and one `name  bit-string  mutation-count` line per fragment
//! - **tsv**: a single table with the reference name as a column
//! - **json**: one object per line holding only the covered positions
//!
//! [`writer::DirectoryWriter`] splits text output into one file per reference.
//! [`rejected::RejectedWriter`] logs fragments that failed an acceptance check
//! as CSV.

pub mod rejected;
pub mod writer;

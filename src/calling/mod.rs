//! Per-position mutation calling.
//!
//! Calling proceeds in layers, each usable on its own:
//!
//! - [`cigar`]: decode the run-length alignment string into operations
//! - [`walk`]: fold those operations over a read to produce its calls
//! - [`deletion`]: decide whether a deletion could have been placed elsewhere
//! - [`merge`]: combine the calls of two mates
//! - [`filter`]: accept or reject a fragment once its calls are known
//! - [`engine`]: the [`BitVectorEngine`](engine::BitVectorEngine) entry point
//!
//! Nothing here performs I/O or fails; malformed input yields fewer calls.

pub mod cigar;
pub mod deletion;
pub mod engine;
pub mod filter;
pub mod merge;
pub mod walk;

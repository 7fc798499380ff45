//! Command-line interface for rna-bitvector.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **classify**: Write a per-position bit vector for every read or mate pair in a SAM file
//! - **check-deletion**: Report whether a deletion could be placed elsewhere in its context
//!
//! ## Usage
//!
//! ```text
//! # Classify reads against their reference
//! rna-bitvector classify aligned.sam --fasta ref.fa -o bitvectors.txt
//!
//! # One file per reference, custom quality table
//! rna-bitvector classify aligned.sam --fasta ref.fa --qscores phred.txt --output-dir out/
//!
//! # JSON lines for scripting
//! rna-bitvector --format json classify aligned.sam --fasta ref.fa
//!
//! # Is the deletion of 2 bases ending at position 40 of "rna1" ambiguous?
//! rna-bitvector check-deletion --fasta ref.fa --contig rna1 --end 40 --length 2
//! ```

use clap::{Parser, Subcommand};

pub mod check_deletion;
pub mod classify;

#[derive(Parser)]
#[command(name = "rna-bitvector")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Per-position mutation bit vectors from aligned reads")]
#[command(
    long_about = "rna-bitvector classifies every reference position covered by an aligned read as a match, a substitution, a deletion, or an inconclusive read-out.\n\nThe two mates of a paired fragment are merged into one bit vector. Low-quality bases and deletions in repetitive context are reported as ambiguous."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify aligned reads into per-position bit vectors
    Classify(classify::ClassifyArgs),

    /// Check whether a deletion is positionally ambiguous
    CheckDeletion(check_deletion::CheckDeletionArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

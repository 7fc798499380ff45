use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::calling::engine::{BitVectorEngine, ClassifierConfig, DEFAULT_SURROUNDING_BASES};
use crate::cli::OutputFormat;
use crate::parsing;
use crate::utils::validation::validate_deletion;

#[derive(Args)]
pub struct CheckDeletionArgs {
    /// Reference sequences (FASTA, plain or gzip compressed)
    #[arg(long, required = true)]
    pub fasta: PathBuf,

    /// Name of the reference sequence holding the deletion
    #[arg(long, required = true)]
    pub contig: String,

    /// 1-based position of the last deleted base
    #[arg(long, required = true)]
    pub end: usize,

    /// Number of deleted bases
    #[arg(long, required = true)]
    pub length: usize,

    /// Bases compared on each side of the deletion
    #[arg(long, default_value_t = DEFAULT_SURROUNDING_BASES)]
    pub surrounding_bases: usize,
}

/// Execute check-deletion subcommand
///
/// # Errors
///
/// Returns an error if the FASTA cannot be read, the contig is unknown, or the
/// deletion does not fit inside the contig.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CheckDeletionArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let references = parsing::fasta::parse_fasta_file(&args.fasta)
        .with_context(|| format!("Failed to load reference {}", args.fasta.display()))?;

    let reference = references
        .get(&args.contig)
        .ok_or_else(|| anyhow::anyhow!("Contig '{}' not found in {}", args.contig, args.fasta.display()))?;

    validate_deletion(reference, args.end, args.length)?;

    let engine = BitVectorEngine::new(ClassifierConfig {
        surrounding_bases: args.surrounding_bases,
        ..ClassifierConfig::default()
    });
    let ambiguous = engine.is_deletion_ambiguous(reference, args.end, args.length);
    let start = args.end + 1 - args.length;

    if verbose {
        let bases = reference.as_bytes();
        eprintln!(
            "Deleted bases: {}",
            String::from_utf8_lossy(&bases[start - 1..args.end])
        );
    }

    match format {
        OutputFormat::Text => {
            let verdict = if ambiguous { "ambiguous" } else { "unambiguous" };
            println!(
                "{}:{start}-{}\tlength {}\t{verdict}",
                args.contig, args.end, args.length
            );
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "contig": args.contig,
                "start": start,
                "end": args.end,
                "length": args.length,
                "surrounding_bases": args.surrounding_bases,
                "ambiguous": ambiguous,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("contig\tstart\tend\tlength\tsurrounding_bases\tambiguous");
            println!(
                "{}\t{start}\t{}\t{}\t{}\t{ambiguous}",
                args.contig, args.end, args.length, args.surrounding_bases
            );
        }
    }

    Ok(())
}

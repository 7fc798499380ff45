use std::cell::Cell;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use clap::Args;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calling::engine::{BitVectorEngine, ClassifierConfig};
use crate::calling::filter::{RejectReason, StricterConstraints};
use crate::cli::OutputFormat;
use crate::core::bitvector::BitVector;
use crate::core::quality::QualityTable;
use crate::core::reference::{ReferenceSequence, ReferenceSet};
use crate::output::rejected::RejectedWriter;
use crate::output::writer::{BitVectorOutput, BitVectorWriter, DirectoryWriter};
use crate::parsing;
use crate::parsing::pairing::{Fragment, Fragments, PairingMode};
use crate::parsing::sam::{ParseError, SamReader};
use crate::utils::validation::validate_data_type;

/// Default minimum mapping quality for a fragment to be classified
pub const DEFAULT_MIN_MAPQ: u8 = 15;

/// Default label written into text-format headers
pub const DEFAULT_DATA_TYPE: &str = "DMS";

/// Default number of fragments classified per parallel batch
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Aligned reads (SAM)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Reference sequences (FASTA, plain or gzip compressed)
    #[arg(long, required = true)]
    pub fasta: PathBuf,

    /// Quality table file (header line, then `score symbol` per line).
    /// Defaults to standard Phred+33.
    #[arg(long)]
    pub qscores: Option<PathBuf>,

    /// JSON configuration file; command-line flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bases with a quality score at or below this value are ambiguous (default 25)
    #[arg(long)]
    pub quality_cutoff: Option<i32>,

    /// Bases compared on each side of a deletion (default 10)
    #[arg(long)]
    pub surrounding_bases: Option<usize>,

    /// Skip fragments with a mate below this mapping quality (default 15)
    #[arg(long)]
    pub min_mapq: Option<u8>,

    /// Label written into text-format headers (default DMS)
    #[arg(long)]
    pub data_type: Option<String>,

    /// How records are grouped into fragments (default auto)
    #[arg(long, value_enum)]
    pub pairing: Option<PairingMode>,

    /// Reject short reads, fragments with many substitutions, and
    /// substitutions close together
    #[arg(long)]
    pub stricter_constraints: bool,

    /// Substitutions this close or closer are rejected (default 5)
    #[arg(long)]
    pub min_mut_distance: Option<usize>,

    /// Minimum mate length as a fraction of the reference length (default 0.10)
    #[arg(long)]
    pub percent_length_cutoff: Option<f64>,

    /// Maximum substitutions per fragment (default 5)
    #[arg(long)]
    pub mutation_count_cutoff: Option<usize>,

    /// Worker threads for classification (0 = all cores)
    #[arg(short = 't', long, default_value = "1")]
    pub threads: usize,

    /// Fragments classified per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Output file (default stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write one `<reference>_bitvectors.txt` file per reference into this directory
    #[arg(long, conflicts_with = "output")]
    pub output_dir: Option<PathBuf>,

    /// Log rejected fragments (reason, reads, bit vector) to this CSV file
    #[arg(long)]
    pub rejected: Option<PathBuf>,
}

/// Settings for a classification run, loadable from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub classifier: ClassifierConfig,
    pub min_mapq: u8,
    pub data_type: String,
    pub pairing: PairingMode,
    pub stricter_constraints: StricterConstraints,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            min_mapq: DEFAULT_MIN_MAPQ,
            data_type: DEFAULT_DATA_TYPE.to_string(),
            pairing: PairingMode::default(),
            stricter_constraints: StricterConstraints::default(),
        }
    }
}

impl RunConfig {
    /// Load from a JSON file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config {}", path.display()))?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Apply command-line overrides
    #[must_use]
    pub fn with_overrides(mut self, args: &ClassifyArgs) -> Self {
        if let Some(cutoff) = args.quality_cutoff {
            self.classifier.quality_cutoff = cutoff;
        }
        if let Some(surrounding) = args.surrounding_bases {
            self.classifier.surrounding_bases = surrounding;
        }
        if let Some(min_mapq) = args.min_mapq {
            self.min_mapq = min_mapq;
        }
        if let Some(data_type) = &args.data_type {
            self.data_type.clone_from(data_type);
        }
        if let Some(pairing) = args.pairing {
            self.pairing = pairing;
        }
        let constraints = &mut self.stricter_constraints;
        if args.stricter_constraints {
            constraints.enabled = true;
        }
        if let Some(distance) = args.min_mut_distance {
            constraints.min_mut_distance = distance;
        }
        if let Some(cutoff) = args.percent_length_cutoff {
            constraints.percent_length_cutoff = cutoff;
        }
        if let Some(cutoff) = args.mutation_count_cutoff {
            constraints.mutation_count_cutoff = cutoff;
        }
        self
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Default)]
struct Summary {
    classified: usize,
    written: usize,
    paired: usize,
    unknown_reference: usize,
    rejected: Rejections,
}

/// Rejected fragments, by reason
#[derive(Debug, Default)]
struct Rejections {
    low_mapq: usize,
    short_read: usize,
    too_many_mutations: usize,
    mutations_too_close: usize,
}

impl Rejections {
    fn record(&mut self, reason: RejectReason) {
        let counter = match reason {
            RejectReason::LowMapq => &mut self.low_mapq,
            RejectReason::ShortRead => &mut self.short_read,
            RejectReason::TooManyMutations => &mut self.too_many_mutations,
            RejectReason::MutationsTooClose => &mut self.mutations_too_close,
        };
        *counter += 1;
    }
}

/// Counts of records dropped before pairing
#[derive(Debug, Default)]
struct RecordCounts {
    total: Cell<usize>,
    malformed: Cell<usize>,
    not_primary: Cell<usize>,
}

impl RecordCounts {
    fn bump(counter: &Cell<usize>) {
        counter.set(counter.get() + 1);
    }
}

/// Execute classify subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read, the configuration is invalid,
/// or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ClassifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    }
    .with_overrides(&args);
    validate_data_type(&config.data_type)?;
    ensure!(args.batch_size > 0, "--batch-size must be at least 1");
    let cutoff = config.stricter_constraints.percent_length_cutoff;
    ensure!(
        (0.0..=1.0).contains(&cutoff),
        "percent_length_cutoff must be between 0 and 1, got {cutoff}"
    );
    debug!(?config, "Run configuration");

    let references = parsing::fasta::parse_fasta_file(&args.fasta)
        .with_context(|| format!("Failed to load reference {}", args.fasta.display()))?;

    let qualities = match &args.qscores {
        Some(path) => parsing::qscores::parse_qscore_file(path)
            .with_context(|| format!("Failed to load quality table {}", path.display()))?,
        None => QualityTable::phred33(),
    };

    if verbose {
        eprintln!("Loaded {} reference sequences", references.len());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()
        .context("Failed to build thread pool")?;

    let mut output = open_output(&args, format, &config.data_type)?;
    let mut rejected = match &args.rejected {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Some(RejectedWriter::new(BufWriter::new(file)).context("Failed to write rejected header")?)
        }
        None => None,
    };
    let engine = BitVectorEngine::new(config.classifier);

    let mut reader = SamReader::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let counts = RecordCounts::default();
    let mut fatal: Option<ParseError> = None;
    let records = reader
        .records()
        .map_while(|result| {
            RecordCounts::bump(&counts.total);
            match result {
                Ok(record) => Some(Some(record)),
                Err(ParseError::InvalidRecord(msg)) => {
                    warn!(error = %msg, "Skipping malformed record");
                    RecordCounts::bump(&counts.malformed);
                    Some(None)
                }
                Err(e) => {
                    fatal = Some(e);
                    None
                }
            }
        })
        .flatten()
        .filter(|record| {
            let keep = record.is_primary_mapped();
            if !keep {
                RecordCounts::bump(&counts.not_primary);
            }
            keep
        });

    let mut fragments = Fragments::new(records, config.pairing);
    let mut summary = Summary::default();
    let mut warned_references = HashSet::new();

    loop {
        let batch: Vec<(Fragment, &ReferenceSequence)> = fragments
            .by_ref()
            .filter_map(|fragment| {
                screen(fragment, &references, &mut summary, &mut warned_references)
            })
            .take(args.batch_size)
            .collect();
        if batch.is_empty() {
            break;
        }

        let results: Vec<BitVector> = pool.install(|| {
            batch
                .par_iter()
                .map(|(fragment, reference)| classify_fragment(&engine, fragment, reference, &qualities))
                .collect()
        });

        for ((fragment, reference), calls) in batch.iter().zip(&results) {
            if let Some(reason) = rejection(fragment, reference, calls, &config) {
                summary.rejected.record(reason);
                if let Some(rejected) = rejected.as_mut() {
                    let mut reads = fragment.reads();
                    if let Some(first) = reads.next() {
                        rejected
                            .write(fragment.name(), reference, reason, first, reads.next(), calls)
                            .context("Failed to write rejected fragment")?;
                    }
                }
                continue;
            }

            output
                .write(fragment.name(), reference, calls)
                .context("Failed to write bit vector")?;
            summary.written += 1;
            if matches!(fragment, Fragment::Paired(..)) {
                summary.paired += 1;
            }
        }
        summary.classified += batch.len();
        debug!(batch = batch.len(), total = summary.classified, "Classified batch");
    }

    let unpaired = fragments.unpaired();
    drop(fragments);
    if let Some(e) = fatal {
        return Err(e).with_context(|| format!("Failed to read {}", args.input.display()));
    }

    output.finish().context("Failed to flush output")?;
    if let Some(rejected) = rejected {
        rejected.finish().context("Failed to flush rejected fragments")?;
    }

    info!(
        records = counts.total.get(),
        classified = summary.classified,
        written = summary.written,
        paired = summary.paired,
        skipped_not_primary = counts.not_primary.get(),
        skipped_malformed = counts.malformed.get(),
        skipped_unpaired = unpaired,
        skipped_unknown_reference = summary.unknown_reference,
        rejected_low_mapq = summary.rejected.low_mapq,
        rejected_short_read = summary.rejected.short_read,
        rejected_too_many_muts = summary.rejected.too_many_mutations,
        rejected_muts_too_close = summary.rejected.mutations_too_close,
        "Classification complete"
    );

    if verbose {
        eprintln!(
            "Classified {} fragments, wrote {} ({} paired)",
            summary.classified, summary.written, summary.paired
        );
    }

    Ok(())
}

fn open_output(args: &ClassifyArgs, format: OutputFormat, data_type: &str) -> anyhow::Result<BitVectorOutput> {
    if let Some(dir) = &args.output_dir {
        ensure!(
            format == OutputFormat::Text,
            "--output-dir writes text format only"
        );
        let writer = DirectoryWriter::new(dir, data_type)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        return Ok(BitVectorOutput::Directory(writer));
    }

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    Ok(BitVectorOutput::Stream(BitVectorWriter::new(out, format, data_type)))
}

/// Find the reference a fragment is classified against
fn screen<'r>(
    fragment: Fragment,
    references: &'r ReferenceSet,
    summary: &mut Summary,
    warned_references: &mut HashSet<String>,
) -> Option<(Fragment, &'r ReferenceSequence)> {
    let Some(reference) = fragment
        .reference_name()
        .and_then(|name| references.get(name))
    else {
        let name = fragment.reference_name().unwrap_or("*").to_string();
        if warned_references.insert(name.clone()) {
            warn!(reference = %name, "Reference not found in FASTA, skipping its reads");
        }
        summary.unknown_reference += 1;
        return None;
    };

    Some((fragment, reference))
}

/// Why a classified fragment is not written, if it is not
fn rejection(
    fragment: &Fragment,
    reference: &ReferenceSequence,
    calls: &BitVector,
    config: &RunConfig,
) -> Option<RejectReason> {
    // Unavailable mapping quality (255) is not a low one
    if fragment.mapping_quality().is_some_and(|mapq| mapq < config.min_mapq) {
        return Some(RejectReason::LowMapq);
    }

    config
        .stricter_constraints
        .check(fragment.reads(), reference, calls)
}

fn classify_fragment(
    engine: &BitVectorEngine,
    fragment: &Fragment,
    reference: &ReferenceSequence,
    qualities: &QualityTable,
) -> BitVector {
    match fragment {
        Fragment::Single(record) => engine.classify_single(&record.read, reference, qualities),
        Fragment::Paired(first, second) => {
            engine.classify_paired(&first.read, &second.read, reference, qualities)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::read::AlignedRead;
    use crate::core::types::PositionCall;
    use crate::parsing::sam::SamRecord;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn single(bases: &str, mapping_quality: Option<u8>) -> Fragment {
        let quals = "I".repeat(bases.len());
        Fragment::Single(SamRecord {
            read: AlignedRead::new("r1", 1, bases, quals, format!("{}M", bases.len())),
            reference_name: Some("ref1".to_string()),
            mapping_quality,
            mate_reference_name: None,
            mate_position: None,
            is_unmapped: false,
            is_secondary: false,
            is_supplementary: false,
            is_segmented: false,
            is_mate_unmapped: false,
        })
    }

    fn args() -> ClassifyArgs {
        ClassifyArgs {
            input: PathBuf::from("in.sam"),
            fasta: PathBuf::from("ref.fa"),
            qscores: None,
            config: None,
            quality_cutoff: None,
            surrounding_bases: None,
            min_mapq: None,
            data_type: None,
            pairing: None,
            stricter_constraints: false,
            min_mut_distance: None,
            percent_length_cutoff: None,
            mutation_count_cutoff: None,
            threads: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            output: None,
            output_dir: None,
            rejected: None,
        }
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.classifier, ClassifierConfig::default());
        assert_eq!(config.min_mapq, 15);
        assert_eq!(config.data_type, "DMS");
        assert_eq!(config.pairing, PairingMode::Auto);
    }

    #[test]
    fn test_run_config_load_partial() {
        let mut temp = NamedTempFile::with_suffix(".json").unwrap();
        temp.write_all(br#"{"classifier": {"surrounding_bases": 4}, "pairing": "single"}"#)
            .unwrap();
        temp.flush().unwrap();

        let config = RunConfig::load(temp.path()).unwrap();
        assert_eq!(config.classifier.surrounding_bases, 4);
        assert_eq!(config.classifier.quality_cutoff, 25);
        assert_eq!(config.pairing, PairingMode::Single);
        assert_eq!(config.min_mapq, DEFAULT_MIN_MAPQ);
    }

    #[test]
    fn test_run_config_load_invalid() {
        let mut temp = NamedTempFile::with_suffix(".json").unwrap();
        temp.write_all(b"{not json").unwrap();
        temp.flush().unwrap();
        assert!(RunConfig::load(temp.path()).is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut args = args();
        args.quality_cutoff = Some(30);
        args.min_mapq = Some(0);
        args.data_type = Some("SHAPE".to_string());

        let config = RunConfig::default().with_overrides(&args);
        assert_eq!(config.classifier.quality_cutoff, 30);
        assert_eq!(config.classifier.surrounding_bases, 10);
        assert_eq!(config.min_mapq, 0);
        assert_eq!(config.data_type, "SHAPE");
    }

    #[test]
    fn test_constraint_overrides() {
        let mut strict = args();
        strict.stricter_constraints = true;
        strict.mutation_count_cutoff = Some(2);

        let config = RunConfig::default().with_overrides(&strict);
        assert!(config.stricter_constraints.enabled);
        assert_eq!(config.stricter_constraints.mutation_count_cutoff, 2);
        assert_eq!(config.stricter_constraints.min_mut_distance, 5);

        let config = RunConfig::default().with_overrides(&args());
        assert!(!config.stricter_constraints.enabled);
    }

    #[test]
    fn test_rejection_reasons() {
        let reference = ReferenceSequence::new("ref1", "ACGTACGTAC");
        let clean: BitVector = (1..=10).map(|pos| (pos, PositionCall::NoMutation)).collect();
        let mut config = RunConfig::default();

        // Low mapping quality rejects even with the stricter constraints off
        let low = single("ACGTACGTAC", Some(5));
        assert_eq!(rejection(&low, &reference, &clean, &config), Some(RejectReason::LowMapq));
        let unavailable = single("ACGTACGTAC", None);
        assert_eq!(rejection(&unavailable, &reference, &clean, &config), None);

        let short = single("A", Some(42));
        assert_eq!(rejection(&short, &reference, &clean, &config), None);
        config.stricter_constraints.enabled = true;
        config.stricter_constraints.percent_length_cutoff = 0.5;
        assert_eq!(
            rejection(&short, &reference, &clean, &config),
            Some(RejectReason::ShortRead)
        );

        // Mapping quality is checked first
        let short_low = single("A", Some(5));
        assert_eq!(
            rejection(&short_low, &reference, &clean, &config),
            Some(RejectReason::LowMapq)
        );

        let full = single("ACGTACGTAC", Some(42));
        let close: BitVector = [
            (2, PositionCall::Substitution(b'A')),
            (4, PositionCall::Substitution(b'A')),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            rejection(&full, &reference, &close, &config),
            Some(RejectReason::MutationsTooClose)
        );

        let many: BitVector = (1..=6).map(|pos| (pos, PositionCall::Substitution(b'G'))).collect();
        assert_eq!(
            rejection(&full, &reference, &many, &config),
            Some(RejectReason::TooManyMutations)
        );
        assert_eq!(rejection(&full, &reference, &clean, &config), None);
    }
}

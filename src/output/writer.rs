use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::bitvector::BitVector;
use crate::core::reference::ReferenceSequence;

/// Suffix of per-reference files written by [`DirectoryWriter`]
pub const BIT_VECTOR_FILE_SUFFIX: &str = "_bitvectors.txt";

/// Column header line of the text format
const TEXT_COLUMNS: &str = "Query_name\tBit_vector\tN_Mutations";

/// Column header line of the TSV format
const TSV_COLUMNS: &str = "query_name\treference\tbit_vector\tn_mutations";

#[derive(Serialize)]
struct JsonRecord<'a> {
    query_name: &'a str,
    reference: &'a str,
    calls: BTreeMap<usize, char>,
    mutations: usize,
}

/// Writes one bit vector per read or fragment to a single stream.
///
/// In text format a header block (`@ref`, `@coordinates:`, column names) is
/// written before the first record and again whenever the reference changes,
/// so an input sorted by reference yields one block per reference.
pub struct BitVectorWriter<W: Write> {
    out: W,
    format: OutputFormat,
    data_type: String,
    current_reference: Option<String>,
    wrote_columns: bool,
}

impl<W: Write> BitVectorWriter<W> {
    pub fn new(out: W, format: OutputFormat, data_type: impl Into<String>) -> Self {
        Self {
            out,
            format,
            data_type: data_type.into(),
            current_reference: None,
            wrote_columns: false,
        }
    }

    /// Write the calls for one read or fragment aligned to `reference`.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write(
        &mut self,
        query_name: &str,
        reference: &ReferenceSequence,
        calls: &BitVector,
    ) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                if self.current_reference.as_deref() != Some(reference.name()) {
                    self.write_reference_header(reference)?;
                    self.current_reference = Some(reference.name().to_string());
                }
                writeln!(
                    self.out,
                    "{query_name}\t{}\t{}",
                    calls.to_bit_string(1, reference.len()),
                    calls.mutation_count()
                )
            }
            OutputFormat::Tsv => {
                if !self.wrote_columns {
                    writeln!(self.out, "{TSV_COLUMNS}")?;
                    self.wrote_columns = true;
                }
                writeln!(
                    self.out,
                    "{query_name}\t{}\t{}\t{}",
                    reference.name(),
                    calls.to_bit_string(1, reference.len()),
                    calls.mutation_count()
                )
            }
            OutputFormat::Json => {
                let record = JsonRecord {
                    query_name,
                    reference: reference.name(),
                    calls: calls.iter().map(|(pos, call)| (pos, call.symbol())).collect(),
                    mutations: calls.mutation_count(),
                };
                serde_json::to_writer(&mut self.out, &record)?;
                writeln!(self.out)
            }
        }
    }

    fn write_reference_header(&mut self, reference: &ReferenceSequence) -> io::Result<()> {
        let sequence = String::from_utf8_lossy(reference.as_bytes());
        writeln!(
            self.out,
            "@ref\t{}\t{sequence}\t{}",
            reference.name(),
            self.data_type
        )?;
        writeln!(self.out, "@coordinates:\t1,{}:{}", reference.len(), reference.len())?;
        writeln!(self.out, "{TEXT_COLUMNS}")
    }

    /// Flush and return the underlying writer
    ///
    /// # Errors
    ///
    /// Returns any error from flushing.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Writes one text-format file per reference, `<name>_bitvectors.txt`,
/// into a directory.
pub struct DirectoryWriter {
    dir: PathBuf,
    data_type: String,
    writers: HashMap<String, BitVectorWriter<BufWriter<File>>>,
    /// Reference name that owns each created file
    owners: HashMap<PathBuf, String>,
}

impl DirectoryWriter {
    /// Create the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: &Path, data_type: impl Into<String>) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            data_type: data_type.into(),
            writers: HashMap::new(),
            owners: HashMap::new(),
        })
    }

    /// Path of the file holding bit vectors for `reference_name`.
    ///
    /// Path separators in the name are replaced so every file lands directly
    /// in the directory.
    #[must_use]
    pub fn file_path(&self, reference_name: &str) -> PathBuf {
        bit_vector_file(&self.dir, reference_name)
    }

    /// Write the calls for one read or fragment into its reference's file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written, or
    /// `ErrorKind::AlreadyExists` if another reference name already maps to
    /// the same file (e.g. `x/y` and `x_y`).
    pub fn write(
        &mut self,
        query_name: &str,
        reference: &ReferenceSequence,
        calls: &BitVector,
    ) -> io::Result<()> {
        let writer = match self.writers.entry(reference.name().to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = bit_vector_file(&self.dir, reference.name());
                if let Some(owner) = self.owners.get(&path) {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!(
                            "References '{owner}' and '{}' both map to {}",
                            reference.name(),
                            path.display()
                        ),
                    ));
                }
                let file = File::create(&path)?;
                self.owners.insert(path, reference.name().to_string());
                entry.insert(BitVectorWriter::new(
                    BufWriter::new(file),
                    OutputFormat::Text,
                    self.data_type.clone(),
                ))
            }
        };
        writer.write(query_name, reference, calls)
    }

    /// Flush every file and return their paths, sorted
    ///
    /// # Errors
    ///
    /// Returns the first flush error.
    pub fn finish(self) -> io::Result<Vec<PathBuf>> {
        for writer in self.writers.into_values() {
            writer.finish()?;
        }
        let mut paths: Vec<PathBuf> = self.owners.into_keys().collect();
        paths.sort();
        Ok(paths)
    }
}

fn bit_vector_file(dir: &Path, reference_name: &str) -> PathBuf {
    let stem: String = reference_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    dir.join(format!("{stem}{BIT_VECTOR_FILE_SUFFIX}"))
}

/// Destination for classified bit vectors
pub enum BitVectorOutput {
    Stream(BitVectorWriter<Box<dyn Write>>),
    Directory(DirectoryWriter),
}

impl BitVectorOutput {
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write(
        &mut self,
        query_name: &str,
        reference: &ReferenceSequence,
        calls: &BitVector,
    ) -> io::Result<()> {
        match self {
            Self::Stream(writer) => writer.write(query_name, reference, calls),
            Self::Directory(writer) => writer.write(query_name, reference, calls),
        }
    }

    /// Flush all output
    ///
    /// # Errors
    ///
    /// Returns any error from flushing.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Stream(writer) => writer.finish().map(drop),
            Self::Directory(writer) => writer.finish().map(drop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PositionCall;
    use tempfile::TempDir;

    fn calls() -> BitVector {
        [
            (1, PositionCall::NoMutation),
            (2, PositionCall::Substitution(b'T')),
            (3, PositionCall::Deletion),
            (4, PositionCall::Ambiguous),
        ]
        .into_iter()
        .collect()
    }

    fn render(format: OutputFormat, records: &[(&str, &ReferenceSequence)]) -> String {
        let mut writer = BitVectorWriter::new(Vec::new(), format, "DMS");
        for (name, reference) in records {
            writer.write(name, reference, &calls()).unwrap();
        }
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_text_format() {
        let reference = ReferenceSequence::new("ref1", "ACGTAC");
        let text = render(OutputFormat::Text, &[("r1", &reference), ("r2", &reference)]);

        assert_eq!(
            text,
            "@ref\tref1\tACGTAC\tDMS\n\
             @coordinates:\t1,6:6\n\
             Query_name\tBit_vector\tN_Mutations\n\
             r1\t0T1?..\t1\n\
             r2\t0T1?..\t1\n"
        );
    }

    #[test]
    fn test_text_header_repeats_on_reference_change() {
        let ref1 = ReferenceSequence::new("ref1", "ACGT");
        let ref2 = ReferenceSequence::new("ref2", "ACGTA");
        let text = render(OutputFormat::Text, &[("r1", &ref1), ("r2", &ref2), ("r3", &ref1)]);

        assert_eq!(text.matches("@ref\t").count(), 3);
        assert!(text.contains("@ref\tref2\tACGTA\tDMS\n@coordinates:\t1,5:5\n"));
        assert!(text.contains("r2\t0T1?.\t1\n"));
    }

    #[test]
    fn test_tsv_format() {
        let reference = ReferenceSequence::new("ref1", "ACGTA");
        let text = render(OutputFormat::Tsv, &[("r1", &reference), ("r2", &reference)]);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], TSV_COLUMNS);
        assert_eq!(lines[1], "r1\tref1\t0T1?.\t1");
    }

    #[test]
    fn test_json_format() {
        let reference = ReferenceSequence::new("ref1", "ACGTA");
        let text = render(OutputFormat::Json, &[("r1", &reference)]);

        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["query_name"], "r1");
        assert_eq!(value["reference"], "ref1");
        assert_eq!(value["mutations"], 1);
        assert_eq!(value["calls"]["2"], "T");
        assert_eq!(value["calls"]["3"], "1");
        assert!(value["calls"].get("5").is_none());
    }

    #[test]
    fn test_directory_writer() {
        let dir = TempDir::new().unwrap();
        let ref1 = ReferenceSequence::new("ref1", "ACGT");
        let ref2 = ReferenceSequence::new("ref2", "ACGTA");

        let mut writer = DirectoryWriter::new(dir.path(), "DMS").unwrap();
        writer.write("r1", &ref1, &calls()).unwrap();
        writer.write("r2", &ref2, &calls()).unwrap();
        writer.write("r3", &ref1, &calls()).unwrap();
        let paths = writer.finish().unwrap();

        assert_eq!(
            paths,
            vec![
                dir.path().join("ref1_bitvectors.txt"),
                dir.path().join("ref2_bitvectors.txt")
            ]
        );

        let ref1_text = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(ref1_text.matches("@ref\t").count(), 1);
        assert_eq!(ref1_text.lines().count(), 5);
    }

    #[test]
    fn test_colliding_file_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        let slashed = ReferenceSequence::new("x/y", "ACGT");
        let underscored = ReferenceSequence::new("x_y", "ACGT");

        let mut writer = DirectoryWriter::new(dir.path(), "DMS").unwrap();
        writer.write("ra", &slashed, &calls()).unwrap();
        let err = writer.write("rb", &underscored, &calls()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(err.to_string().contains("'x/y' and 'x_y'"));

        // The first reference's file is left intact
        writer.write("rc", &slashed, &calls()).unwrap();
        let paths = writer.finish().unwrap();
        assert_eq!(paths, vec![dir.path().join("x_y_bitvectors.txt")]);

        let text = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(text.starts_with("@ref\tx/y\t"));
        assert!(text.contains("ra\t"));
        assert!(text.contains("rc\t"));
        assert!(!text.contains("rb\t"));
    }

    #[test]
    fn test_file_path_replaces_separators() {
        let dir = TempDir::new().unwrap();
        let writer = DirectoryWriter::new(dir.path(), "DMS").unwrap();
        assert_eq!(
            writer.file_path("chr1/part"),
            dir.path().join("chr1_part_bitvectors.txt")
        );
    }
}

//! Quality-score table files.
//!
//! The format is a header line followed by one whitespace-separated
//! `score symbol` pair per line:
//!
//! ```text
//! score  symbol
//! 0      !
//! 1      "
//! ...
//! ```
//!
//! Blank lines are ignored.

use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::quality::QualityTable;
use crate::parsing::sam::ParseError;

/// Load a quality table from a file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or
/// `ParseError::InvalidFormat` for a malformed line.
pub fn parse_qscore_file(path: &Path) -> Result<QualityTable, ParseError> {
    let file = std::fs::File::open(path)?;
    read_qscores(BufReader::new(file))
}

/// Load a quality table from a buffered source.
///
/// # Errors
///
/// See [`parse_qscore_file`].
pub fn read_qscores<R: BufRead>(reader: R) -> Result<QualityTable, ParseError> {
    let mut table = QualityTable::empty();

    // First line is a header
    for (idx, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (score, symbol) = parse_line(line).ok_or_else(|| {
            ParseError::InvalidFormat(format!(
                "Line {}: expected '<score> <symbol>', got '{line}'",
                idx + 1
            ))
        })?;
        table.insert(symbol, score);
    }

    Ok(table)
}

fn parse_line(line: &str) -> Option<(i32, u8)> {
    let mut fields = line.split_whitespace();
    let score = fields.next()?.parse::<i32>().ok()?;
    let symbol = match fields.next()?.as_bytes() {
        [symbol] => *symbol,
        _ => return None,
    };
    Some((score, symbol))
}

//! Parser for mixture-table files.
//!
//! One heavy element per line, its mass fraction given as a multiple of
//! the total metallicity:
//! ```text
//! # mixture relative to Z
//! C   0.1721
//! N = 0.0504
//! O   0.4825   # oxygen dominates
//! ```
//!
//! `#` starts a comment running to the end of the line. Blank lines are
//! skipped but still counted, so reported line numbers match an editor.
//! Key and value are separated by whitespace, a single `=`, or both.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::provider::MixtureError;
use crate::table::{MixtureEntry, MixtureTable, RESERVED_LABEL};

/// Parse a mixture table held in memory.
///
/// `origin` is only used to label errors.
pub fn parse_mixture(content: &str, origin: &Path) -> Result<MixtureTable, MixtureError> {
    read_mixture(content.as_bytes(), origin)
}

/// Read a mixture table line by line.
///
/// Lines are read as bytes; comments may hold any encoding, but labels and
/// values must be valid UTF-8. Stops at the first malformed line; no
/// partial table is returned.
pub fn read_mixture<R: BufRead>(mut reader: R, origin: &Path) -> Result<MixtureTable, MixtureError> {
    let mut table = MixtureTable::new();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| MixtureError::ConfigUnreadable {
                path: origin.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let syntax_error = |message: String| MixtureError::ConfigSyntax {
            path: origin.to_path_buf(),
            line: line_no,
            message,
        };

        let line = std::str::from_utf8(strip_comment(&buf))
            .map_err(|_| syntax_error("entry is not valid UTF-8".into()))?;
        let parsed = parse_line(line).map_err(syntax_error)?;

        if let Some((label, fraction_of_z)) = parsed {
            if let Some(previous) = table.get(label) {
                log::warn!(
                    "{}:{}: '{}' redefined ({} -> {})",
                    origin.display(),
                    line_no,
                    label,
                    previous,
                    fraction_of_z
                );
            }
            table.push(MixtureEntry {
                label: label.to_string(),
                fraction_of_z,
                line: line_no,
            });
        }
    }

    log::debug!(
        "Read {} mixture entries from {}",
        table.len(),
        origin.display()
    );
    Ok(table)
}

/// Open and read a mixture-table file.
///
/// The file handle lives only inside this call and is closed on every
/// return path, including errors.
pub fn load_mixture(path: &Path) -> Result<MixtureTable, MixtureError> {
    let file = File::open(path).map_err(|source| MixtureError::ConfigUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    read_mixture(BufReader::new(file), path)
}

/// Bytes before the first `#`, without the line terminator.
fn strip_comment(raw: &[u8]) -> &[u8] {
    let end = raw
        .iter()
        .position(|&b| b == b'#' || b == b'\n')
        .unwrap_or(raw.len());
    &raw[..end]
}

/// Split one comment-free line into `(label, value)`.
///
/// `Ok(None)` for blank and comment-only lines.
fn parse_line(line: &str) -> Result<Option<(&str, f64)>, String> {
    let content = line.trim();
    if content.is_empty() {
        return Ok(None);
    }

    let (label, rest) = match content.find(|c: char| c == '=' || c.is_whitespace()) {
        Some(pos) => (&content[..pos], &content[pos..]),
        None => (content, ""),
    };
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim();

    if label.is_empty() {
        return Err("missing species label".into());
    }
    if label == RESERVED_LABEL {
        return Err(format!(
            "'{}' is reserved for the normalisation residual",
            label
        ));
    }

    let mut tokens = rest.split_whitespace();
    let value = match tokens.next() {
        Some(v) => v,
        None => return Err(format!("missing value for '{}'", label)),
    };
    if let Some(extra) = tokens.next() {
        return Err(format!(
            "unexpected '{}' after value for '{}'",
            extra, label
        ));
    }

    let fraction_of_z = value
        .parse::<f64>()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| format!("invalid value '{}' for '{}'", value, label))?;

    Ok(Some((label, fraction_of_z)))
}

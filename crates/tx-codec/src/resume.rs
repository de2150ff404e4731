//! Last-data-row scan for append-resume.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tx_core::schema::ScanRow;

use crate::error::CodecResult;
use crate::row::parse_row;

/// Find and parse the last data row of a CNV file.
///
/// Header lines (`*` or `#` prefixed) and blank lines are skipped. Returns
/// `Ok(None)` when the file holds no data lines at all; a malformed final
/// data line is an error so the caller can decide to start fresh.
pub fn read_last_row(path: &Path) -> CodecResult<Option<ScanRow>> {
    let reader = BufReader::new(File::open(path)?);
    let mut last = None;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('*') || line.starts_with('#') {
            continue;
        }
        last = Some(line);
    }
    match last {
        Some(line) => Ok(Some(parse_row(&line)?)),
        None => Ok(None),
    }
}

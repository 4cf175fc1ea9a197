//! Delimited text tables

use std::{fs::File, io, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{ModalError, Result};

/// Opens a comma separated table without header
pub(crate) fn open(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ModalError::ConfigNotFound(path.to_path_buf()),
        _ => ModalError::Io(e),
    })?;
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file))
}

/// Returns the non-blank records of a table with their line number
pub(crate) fn records<R: io::Read>(
    reader: &mut csv::Reader<R>,
    origin: &str,
) -> Result<Vec<(u64, StringRecord)>> {
    let mut records = vec![];
    for record in reader.records() {
        let record = record.map_err(|e| ModalError::ConfigParse {
            origin: origin.to_string(),
            line: e.position().map_or(0, |p| p.line()),
            reason: e.to_string(),
        })?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        records.push((line, record));
    }
    Ok(records)
}

/// Parses a numeric token
pub(crate) fn parse_value(token: &str, origin: &str, line: u64) -> Result<f64> {
    let error = |reason: String| ModalError::ConfigParse {
        origin: origin.to_string(),
        line,
        reason,
    };
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(error(format!("{token:?} is not a finite number"))),
        Err(e) => Err(error(format!("{token:?} is not a number ({e})"))),
    }
}

/// Parses all the tokens of a record
pub(crate) fn parse_record(record: &StringRecord, origin: &str, line: u64) -> Result<Vec<f64>> {
    record
        .iter()
        .map(|token| parse_value(token, origin, line))
        .collect()
}

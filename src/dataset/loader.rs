use crate::core::error::{KClusterError, KClusterResult};
use crate::core::float::KFloat;
use crate::dataset::record::Record;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How rows of delimited text map onto records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Treat the first field of every row as the record label.
    pub has_label: bool,
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            has_label: true,
            delimiter: b',',
        }
    }
}

/// Loads records from a delimited text file. The first line is a header.
pub fn load_delimited_path<F: KFloat>(
    path: &Path,
    options: &LoadOptions,
) -> KClusterResult<Vec<Record<F>>> {
    let file = File::open(path)?;
    load_delimited(file, options)
}

/// Loads records from delimited text. The first line is a header; every
/// following row must have the same number of fields as the header, and every
/// non-label field must parse as a number.
pub fn load_delimited<F: KFloat, R: Read>(
    reader: R,
    options: &LoadOptions,
) -> KClusterResult<Vec<Record<F>>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header = reader
        .headers()
        .map_err(|e| KClusterError::MalformedInput(format!("line 1: {}", e)))?
        .clone();
    let expected = header.len();
    let first_feature = usize::from(options.has_label);
    if expected <= first_feature {
        return Err(KClusterError::MalformedInput(format!(
            "line 1: header has {} fields, no numeric feature columns",
            expected
        )));
    }
    debug!("Header columns: {:?}", header.iter().collect::<Vec<_>>());

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| KClusterError::MalformedInput(e.to_string()))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.len() != expected {
            return Err(KClusterError::MalformedInput(format!(
                "line {}: expected {} fields, got {}",
                line,
                expected,
                row.len()
            )));
        }
        records.push(parse_row(&row, &header, first_feature, line)?);
    }
    Ok(records)
}

fn parse_row<F: KFloat>(
    row: &StringRecord,
    header: &StringRecord,
    first_feature: usize,
    line: u64,
) -> KClusterResult<Record<F>> {
    let label = if first_feature == 1 {
        row.get(0).map(str::to_string)
    } else {
        None
    };

    let features = row
        .iter()
        .enumerate()
        .skip(first_feature)
        .map(|(idx, cell)| {
            cell.parse::<f64>()
                .ok()
                .and_then(F::from_f64)
                .ok_or_else(|| {
                    KClusterError::MalformedInput(format!(
                        "line {}: column '{}' value '{}' is not numeric",
                        line,
                        header.get(idx).unwrap_or("?"),
                        cell
                    ))
                })
        })
        .collect::<KClusterResult<Vec<F>>>()?;

    Ok(Record { label, features })
}

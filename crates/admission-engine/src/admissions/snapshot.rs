//! Semicolon-delimited snapshot format shared by exports, imports and seeding.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::domain::{AdmissionListing, AdmissionRecord, ProgramInfo};
use super::normalizer::strip_bom;
use super::repository::RepositoryError;
use super::schema::{export_headers, is_known_header, Column, DISPLAY_COLUMNS, INFO_LINK_COLUMN};

const DELIMITER: u8 = b';';
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How an import treats headers that are not part of the snapshot format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownHeaderPolicy {
    #[default]
    Ignore,
    Reject,
}

/// One data row as `header -> trimmed value`.
pub type ImportRow = BTreeMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct ParsedRows {
    pub headers: Vec<String>,
    pub rows: Vec<ImportRow>,
    /// Headers outside the snapshot format, in first-seen order.
    pub unknown_headers: Vec<String>,
}

/// Non-empty, trimmed cell of a row.
pub fn row_cell<'a>(row: &'a ImportRow, name: &str) -> Option<&'a str> {
    row.get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

pub fn read_rows<R: Read>(reader: R, policy: UnknownHeaderPolicy) -> Result<ParsedRows, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| strip_bom(header).trim().to_string())
        .collect();

    let mut seen = BTreeSet::new();
    let unknown_headers: Vec<String> = headers
        .iter()
        .filter(|header| !header.is_empty() && !is_known_header(header))
        .filter(|header| seen.insert(header.as_str()))
        .cloned()
        .collect();

    if policy == UnknownHeaderPolicy::Reject && !unknown_headers.is_empty() {
        return Err(ImportError::UnknownHeaders(unknown_headers));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: ImportRow = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(index, header)| {
                let value = record.get(index).unwrap_or("").trim().to_string();
                (header.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    Ok(ParsedRows {
        headers,
        rows,
        unknown_headers,
    })
}

/// Writes a BOM-prefixed snapshot of `listings` and hands the writer back.
pub fn write_snapshot<W: Write>(listings: &[AdmissionListing], writer: W) -> Result<W, ExportError> {
    let rows = listings
        .iter()
        .map(|listing| snapshot_cells(&listing.record, Some(&listing.program)));
    write_rows(export_headers(), rows, writer)
}

/// Writes every record in the seeding format: programme columns where the
/// programme is known, blanks otherwise, and a trailing `infoLink` column.
pub fn write_seed_snapshot<W: Write>(
    records: &[AdmissionRecord],
    programs: &BTreeMap<String, ProgramInfo>,
    writer: W,
) -> Result<W, ExportError> {
    let mut headers = export_headers();
    headers.push(INFO_LINK_COLUMN);

    let rows = records.iter().map(|record| {
        let program = programs.get(&record.program_key);
        let mut cells = snapshot_cells(record, program);
        cells.push(program.and_then(|program| program.info_link.clone()).unwrap_or_default());
        cells
    });
    write_rows(headers, rows, writer)
}

fn snapshot_cells(record: &AdmissionRecord, program: Option<&ProgramInfo>) -> Vec<String> {
    let mut cells = vec![record.id.to_string(), record.program_key.clone()];
    match program {
        Some(program) => cells.extend([
            program.name.clone(),
            program.institution.clone().unwrap_or_default(),
            program.city.clone().unwrap_or_default(),
            program.start_term.clone().unwrap_or_default(),
        ]),
        None => cells.extend(DISPLAY_COLUMNS.map(|_| String::new())),
    }
    cells.extend(
        Column::statistics()
            .into_iter()
            .map(|column| record.cell(column).unwrap_or_default()),
    );
    cells
}

fn write_rows<W, I>(headers: Vec<&str>, rows: I, mut writer: W) -> Result<W, ExportError>
where
    W: Write,
    I: IntoIterator<Item = Vec<String>>,
{
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);
    csv_writer.write_record(headers)?;
    for cells in rows {
        csv_writer.write_record(&cells)?;
    }

    csv_writer.flush()?;
    csv_writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}

pub fn export_csv(listings: &[AdmissionListing]) -> Result<Vec<u8>, ExportError> {
    write_snapshot(listings, Vec::new())
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read import data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown columns in import: {}", .0.join(", "))]
    UnknownHeaders(Vec<String>),
    #[error("could not persist import: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode export: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not read admission data: {0}")]
    Repository(#[from] RepositoryError),
}

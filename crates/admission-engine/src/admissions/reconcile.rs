use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{AdmissionRecord, RecordId};
use super::repository::{AdmissionRepository, AdmissionTransaction, RepositoryError};
use super::schema::{Column, FieldSet};
use super::snapshot::{read_rows, row_cell, ImportError, ImportRow, UnknownHeaderPolicy};

/// What happened to a single import row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Updated,
    Inserted,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    /// 1-based position of the row in the input, header excluded.
    pub row: usize,
    pub action: RowAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    pub message: String,
}

/// Outcome of one reconciliation call. Counters always sum to the row count
/// and there is exactly one entry per row, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub updated: usize,
    pub inserted: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_headers: Vec<String>,
    pub entries: Vec<RowOutcome>,
    pub completed_at: DateTime<Utc>,
}

impl ReconciliationReport {
    fn new() -> Self {
        Self {
            updated: 0,
            inserted: 0,
            skipped: 0,
            ignored_headers: Vec::new(),
            entries: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    fn push(&mut self, outcome: RowOutcome) {
        match outcome.action {
            RowAction::Updated => self.updated += 1,
            RowAction::Inserted => self.inserted += 1,
            RowAction::Skipped => self.skipped += 1,
        }
        self.entries.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.updated + self.inserted + self.skipped
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.message.as_str())
    }
}

/// Merges externally supplied rows into the admission-statistics table.
///
/// Every row of a call runs inside one store transaction: the batch is
/// committed after the last row, and any storage failure abandons it whole.
pub struct ReconciliationImporter<R> {
    repository: Arc<R>,
    header_policy: UnknownHeaderPolicy,
}

impl<R> ReconciliationImporter<R>
where
    R: AdmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            header_policy: UnknownHeaderPolicy::default(),
        }
    }

    pub fn with_header_policy(mut self, policy: UnknownHeaderPolicy) -> Self {
        self.header_policy = policy;
        self
    }

    /// Parses a semicolon-delimited file and reconciles its rows.
    pub fn import_csv<Rd: Read>(&self, reader: Rd) -> Result<ReconciliationReport, ImportError> {
        let parsed = read_rows(reader, self.header_policy)?;
        if !parsed.unknown_headers.is_empty() {
            warn!(headers = ?parsed.unknown_headers, "ignoring unknown import columns");
        }

        let mut report = self.reconcile(&parsed.rows)?;
        report.ignored_headers = parsed.unknown_headers;
        Ok(report)
    }

    pub fn reconcile(&self, rows: &[ImportRow]) -> Result<ReconciliationReport, ImportError> {
        info!(rows = rows.len(), "starting admission reconciliation");

        let mut transaction = self.repository.begin()?;
        let mut report = ReconciliationReport::new();

        for (index, row) in rows.iter().enumerate() {
            let outcome = reconcile_row(transaction.as_mut(), row, index + 1)?;
            report.push(outcome);
        }

        transaction.commit()?;
        report.completed_at = Utc::now();

        info!(
            updated = report.updated,
            inserted = report.inserted,
            skipped = report.skipped,
            "admission reconciliation committed"
        );
        Ok(report)
    }
}

fn reconcile_row(
    transaction: &mut dyn AdmissionTransaction,
    row: &ImportRow,
    position: usize,
) -> Result<RowOutcome, RepositoryError> {
    let fields = FieldSet::from_row(row.iter().map(|(name, value)| (name.as_str(), value.as_str())));
    let program_key = row_cell(row, Column::ProgramKey.name());

    if let Some(existing) = resolve_target(&*transaction, row, program_key)? {
        if !fields.is_empty() {
            transaction.update_fields(existing.id, &fields)?;
        }
        let natural_key = program_key.unwrap_or(existing.program_key.as_str());
        debug!(row = position, id = %existing.id, "updated admission record");
        return Ok(RowOutcome {
            row: position,
            action: RowAction::Updated,
            record_id: Some(existing.id),
            message: format!("updated id={} (programKey={natural_key})", existing.id),
        });
    }

    let Some(program_key) = program_key else {
        warn!(row = position, "import row without id match or programKey skipped");
        return Ok(RowOutcome {
            row: position,
            action: RowAction::Skipped,
            record_id: None,
            message: "skipped: missing programKey (a new record requires programKey)".to_string(),
        });
    };

    let id = transaction.insert(program_key, &fields)?;
    debug!(row = position, %id, program_key, "inserted admission record");
    Ok(RowOutcome {
        row: position,
        action: RowAction::Inserted,
        record_id: Some(id),
        message: format!("created id={id} (programKey={program_key})"),
    })
}

/// Primary key first, then a unique natural key. An ambiguous natural key
/// resolves to no record rather than failing the batch.
fn resolve_target(
    transaction: &dyn AdmissionTransaction,
    row: &ImportRow,
    program_key: Option<&str>,
) -> Result<Option<AdmissionRecord>, RepositoryError> {
    if let Some(id) = row_cell(row, Column::Id.name()).and_then(RecordId::parse) {
        if let Some(record) = transaction.find_by_id(id)? {
            return Ok(Some(record));
        }
    }

    let Some(key) = program_key else {
        return Ok(None);
    };

    match transaction.find_by_program_key(key) {
        Ok(found) => Ok(found),
        Err(RepositoryError::AmbiguousProgramKey { key, matches }) => {
            debug!(%key, matches, "ambiguous programKey treated as no existing record");
            Ok(None)
        }
        Err(other) => Err(other),
    }
}

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use super::domain::{AdmissionListing, AdmissionRecord, ProgramInfo, RecordId};
use super::repository::{
    AdmissionRepository, AdmissionTransaction, ListingFilter, ListingOrder, RepositoryError,
};
use super::schema::{Column, FieldSet};
use super::snapshot::{
    read_rows, row_cell, write_seed_snapshot, ExportError, ImportError, ImportRow,
    UnknownHeaderPolicy,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    records: BTreeMap<RecordId, AdmissionRecord>,
    programs: BTreeMap<String, ProgramInfo>,
}

impl Tables {
    fn next_id(&self) -> Result<RecordId, RepositoryError> {
        match self.records.keys().next_back() {
            Some(last) => last.0.checked_add(1).map(RecordId).ok_or_else(|| {
                RepositoryError::Unavailable(format!("record id space exhausted after {last}"))
            }),
            None => Ok(RecordId(1)),
        }
    }
}

/// Mutex-backed store used by the service, the CLI and tests.
///
/// A transaction holds the lock for its whole lifetime and works on a copy of
/// the tables, so concurrent writers serialise and an abandoned batch leaves
/// no trace.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAdmissionStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryAdmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store from an export-format snapshot (optionally with `infoLink`).
    pub fn load_snapshot<R: Read>(reader: R) -> Result<Self, ImportError> {
        let parsed = read_rows(reader, UnknownHeaderPolicy::Ignore)?;
        let store = Self::default();
        {
            let mut tables = store.lock()?;
            for (index, row) in parsed.rows.iter().enumerate() {
                seed_row(&mut tables, row, index + 2)?;
            }
            debug!(
                records = tables.records.len(),
                programs = tables.programs.len(),
                "seeded admission store from snapshot"
            );
        }
        Ok(store)
    }

    pub fn add_program(&self, program: ProgramInfo) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.programs.insert(program.program_key.clone(), program);
        Ok(())
    }

    /// Inserts or replaces a record under its own id.
    pub fn put_record(&self, record: AdmissionRecord) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.records.insert(record.id, record);
        Ok(())
    }

    pub fn records(&self) -> Result<Vec<AdmissionRecord>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.records.values().cloned().collect())
    }

    /// Writes the whole table in the format [`Self::load_snapshot`] reads,
    /// including records whose programme is unknown.
    pub fn write_snapshot<W: Write>(&self, writer: W) -> Result<W, ExportError> {
        let tables = self.lock()?;
        let records: Vec<AdmissionRecord> = tables.records.values().cloned().collect();
        write_seed_snapshot(&records, &tables.programs, writer)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("admission store lock poisoned".to_string()))
    }
}

fn seed_row(tables: &mut Tables, row: &ImportRow, line: usize) -> Result<(), RepositoryError> {
    let Some(program_key) = row_cell(row, Column::ProgramKey.name()) else {
        warn!(line, "snapshot row without programKey skipped");
        return Ok(());
    };

    let id = match row_cell(row, Column::Id.name()).and_then(RecordId::parse) {
        Some(id) => id,
        None => tables.next_id()?,
    };
    if tables.records.contains_key(&id) {
        warn!(line, id = id.0, "snapshot repeats record id, later row wins");
    }

    let mut record = AdmissionRecord::new(id, program_key);
    record.apply(&FieldSet::from_row(
        row.iter().map(|(name, value)| (name.as_str(), value.as_str())),
    ));

    if let Some(name) = row_cell(row, "name") {
        tables
            .programs
            .entry(program_key.to_string())
            .or_insert_with(|| ProgramInfo {
                program_key: program_key.to_string(),
                name: name.to_string(),
                institution: row_cell(row, "institution").map(str::to_string),
                city: row_cell(row, "city").map(str::to_string),
                start_term: row_cell(row, "startTerm").map(str::to_string),
                info_link: row_cell(row, "infoLink").map(str::to_string),
            });
    }

    tables.records.insert(id, record);
    Ok(())
}

impl AdmissionRepository for InMemoryAdmissionStore {
    fn list_joined(&self, filter: &ListingFilter) -> Result<Vec<AdmissionListing>, RepositoryError> {
        let tables = self.lock()?;
        let institution = non_blank(filter.institution.as_deref());
        let city = non_blank(filter.city.as_deref()).map(str::to_lowercase);

        let mut listings: Vec<AdmissionListing> = tables
            .records
            .values()
            .filter_map(|record| {
                let program = tables.programs.get(&record.program_key)?;
                Some(AdmissionListing {
                    record: record.clone(),
                    program: program.clone(),
                })
            })
            .filter(|listing| match institution {
                Some(wanted) => listing.program.institution.as_deref() == Some(wanted),
                None => true,
            })
            .filter(|listing| match city.as_deref() {
                Some(wanted) => listing
                    .program
                    .city
                    .as_deref()
                    .map(|city| city.to_lowercase().contains(wanted))
                    .unwrap_or(false),
                None => true,
            })
            .filter(|listing| match filter.threshold_ceiling {
                Some(ceiling) => stored_number(&listing.record)
                    .map(|threshold| threshold <= ceiling)
                    .unwrap_or(true),
                None => true,
            })
            .collect();

        if filter.order == ListingOrder::ThresholdDescThenName {
            listings.sort_by(|left, right| {
                compare_stored(stored_number(&right.record), stored_number(&left.record))
                    .then_with(|| left.program.name.cmp(&right.program.name))
            });
        }

        Ok(listings)
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<AdmissionRecord>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.records.get(&id).cloned())
    }

    fn programs(&self) -> Result<Vec<ProgramInfo>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.programs.values().cloned().collect())
    }

    fn begin(&self) -> Result<Box<dyn AdmissionTransaction + '_>, RepositoryError> {
        let guard = self.lock()?;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

struct MemoryTransaction<'a> {
    guard: MutexGuard<'a, Tables>,
    working: Tables,
}

impl AdmissionTransaction for MemoryTransaction<'_> {
    fn find_by_id(&self, id: RecordId) -> Result<Option<AdmissionRecord>, RepositoryError> {
        Ok(self.working.records.get(&id).cloned())
    }

    fn find_by_program_key(&self, key: &str) -> Result<Option<AdmissionRecord>, RepositoryError> {
        let mut matches = self
            .working
            .records
            .values()
            .filter(|record| record.program_key == key);

        let first = matches.next();
        let extra = matches.count();
        if extra > 0 {
            return Err(RepositoryError::AmbiguousProgramKey {
                key: key.to_string(),
                matches: extra + 1,
            });
        }
        Ok(first.cloned())
    }

    fn insert(&mut self, program_key: &str, fields: &FieldSet) -> Result<RecordId, RepositoryError> {
        let id = self.working.next_id()?;
        let mut record = AdmissionRecord::new(id, program_key);
        record.apply(fields);
        record.program_key = program_key.to_string();
        self.working.records.insert(id, record);
        Ok(id)
    }

    fn update_fields(&mut self, id: RecordId, fields: &FieldSet) -> Result<(), RepositoryError> {
        let record = self
            .working
            .records
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        record.apply(fields);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Numeric view of the stored threshold as the storage engine sees it: plain
/// period-separated decimals only.
fn stored_number(record: &AdmissionRecord) -> Option<f64> {
    record
        .admission_threshold
        .as_deref()
        .and_then(|value| value.trim().parse::<f64>().ok())
}

fn compare_stored(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

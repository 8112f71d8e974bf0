use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::admissions::domain::{AdmissionListing, AdmissionRecord, ProgramInfo, RecordId};
use crate::admissions::repository::{
    AdmissionRepository, AdmissionTransaction, ListingFilter, RepositoryError,
};
use crate::admissions::schema::FieldSet;
use crate::admissions::snapshot::ImportRow;
use crate::admissions::{AdmissionAdminService, InMemoryAdmissionStore};

pub(super) fn program(key: &str, name: &str) -> ProgramInfo {
    ProgramInfo {
        program_key: key.to_string(),
        name: name.to_string(),
        institution: Some("Aarhus University".to_string()),
        city: Some("Aarhus".to_string()),
        start_term: Some("Summer".to_string()),
        info_link: None,
    }
}

/// Three joined records (ids 1-3) and one pair sharing the natural key `DUP`.
pub(super) fn seeded_store() -> InMemoryAdmissionStore {
    let store = InMemoryAdmissionStore::new();
    for (key, name) in [
        ("K100", "Medicine"),
        ("K200", "Law"),
        ("K300", "Nursing"),
        ("DUP", "Economics"),
    ] {
        store.add_program(program(key, name)).expect("program added");
    }

    let mut medicine = AdmissionRecord::new(RecordId(1), "K100");
    medicine.admitted_total = Some(120);
    medicine.applications_total = Some(900);
    medicine.admission_threshold = Some("10.9".to_string());
    medicine.waitlist_threshold = Some("10.5".to_string());

    let mut law = AdmissionRecord::new(RecordId(2), "K200");
    law.admitted_total = Some(300);
    law.admission_threshold = Some("8.4".to_string());

    let nursing = AdmissionRecord::new(RecordId(3), "K300");

    for record in [
        medicine,
        law,
        nursing,
        AdmissionRecord::new(RecordId(4), "DUP"),
        AdmissionRecord::new(RecordId(5), "DUP"),
    ] {
        store.put_record(record).expect("record stored");
    }
    store
}

pub(super) fn admin_service(store: InMemoryAdmissionStore) -> AdmissionAdminService<InMemoryAdmissionStore> {
    AdmissionAdminService::new(Arc::new(store))
}

pub(super) fn row(fields: &[(&str, &str)]) -> ImportRow {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Delegates to an in-memory store but refuses to commit.
#[derive(Default)]
pub(super) struct CommitFailingStore {
    pub(super) inner: InMemoryAdmissionStore,
}

struct CommitFailingTransaction<'a> {
    inner: Box<dyn AdmissionTransaction + 'a>,
}

impl AdmissionTransaction for CommitFailingTransaction<'_> {
    fn find_by_id(&self, id: RecordId) -> Result<Option<AdmissionRecord>, RepositoryError> {
        self.inner.find_by_id(id)
    }

    fn find_by_program_key(&self, key: &str) -> Result<Option<AdmissionRecord>, RepositoryError> {
        self.inner.find_by_program_key(key)
    }

    fn insert(&mut self, program_key: &str, fields: &FieldSet) -> Result<RecordId, RepositoryError> {
        self.inner.insert(program_key, fields)
    }

    fn update_fields(&mut self, id: RecordId, fields: &FieldSet) -> Result<(), RepositoryError> {
        self.inner.update_fields(id, fields)
    }

    fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("connection lost during commit".to_string()))
    }
}

impl AdmissionRepository for CommitFailingStore {
    fn list_joined(&self, filter: &ListingFilter) -> Result<Vec<AdmissionListing>, RepositoryError> {
        self.inner.list_joined(filter)
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<AdmissionRecord>, RepositoryError> {
        AdmissionRepository::find_by_id(&self.inner, id)
    }

    fn programs(&self) -> Result<Vec<ProgramInfo>, RepositoryError> {
        self.inner.programs()
    }

    fn begin(&self) -> Result<Box<dyn AdmissionTransaction + '_>, RepositoryError> {
        Ok(Box::new(CommitFailingTransaction {
            inner: self.inner.begin()?,
        }))
    }
}

pub(super) struct UnavailableStore;

impl AdmissionRepository for UnavailableStore {
    fn list_joined(&self, _filter: &ListingFilter) -> Result<Vec<AdmissionListing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_id(&self, _id: RecordId) -> Result<Option<AdmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn programs(&self) -> Result<Vec<ProgramInfo>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn begin(&self) -> Result<Box<dyn AdmissionTransaction + '_>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf8 body")
}

//! Canonical admission-statistics table: schema, normalisation, storage,
//! CSV snapshots, reconciliation imports and administrative edits.

pub mod domain;
pub mod edits;
pub mod memory;
pub mod normalizer;
pub mod reconcile;
pub mod repository;
pub mod router;
pub mod schema;
pub mod service;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use domain::{AdmissionListing, AdmissionRecord, ProgramInfo, RecordId};
pub use edits::{BatchEditSummary, EditError, FieldEdit};
pub use memory::InMemoryAdmissionStore;
pub use normalizer::{normalize_quotient_for_storage, parse_quotient, SCALE_MAX, SCALE_MIN};
pub use reconcile::{ReconciliationImporter, ReconciliationReport, RowAction, RowOutcome};
pub use repository::{
    AdmissionRepository, AdmissionTransaction, ListingFilter, ListingOrder, RepositoryError,
};
pub use router::admin_router;
pub use schema::{Column, ColumnKind, FieldSet, FieldValue};
pub use service::AdmissionAdminService;
pub use snapshot::{
    export_csv, read_rows, write_seed_snapshot, write_snapshot, ExportError, ImportError, ImportRow, ParsedRows,
    UnknownHeaderPolicy,
};

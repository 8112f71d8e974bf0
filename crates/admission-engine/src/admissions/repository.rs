use super::domain::{AdmissionListing, AdmissionRecord, ProgramInfo, RecordId};
use super::schema::FieldSet;

/// Ordering applied by [`AdmissionRepository::list_joined`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingOrder {
    /// Ascending surrogate id; used by the admin table and exports.
    #[default]
    ById,
    /// Descending stored threshold, then programme name. Null or non-numeric
    /// thresholds rank lowest.
    ThresholdDescThenName,
}

/// Source-level filters for joined listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    /// Exact match on the owning institution.
    pub institution: Option<String>,
    /// Substring match on the city.
    pub city: Option<String>,
    /// Keep rows whose stored threshold is open, not plainly numeric, or at most this value.
    pub threshold_ceiling: Option<f64>,
    pub order: ListingOrder,
}

impl ListingFilter {
    pub fn ordered_by_id() -> Self {
        Self::default()
    }
}

/// Storage abstraction so services can be exercised in isolation.
pub trait AdmissionRepository: Send + Sync {
    /// Records joined with their programme; records without one are excluded.
    fn list_joined(&self, filter: &ListingFilter) -> Result<Vec<AdmissionListing>, RepositoryError>;
    fn find_by_id(&self, id: RecordId) -> Result<Option<AdmissionRecord>, RepositoryError>;
    fn programs(&self) -> Result<Vec<ProgramInfo>, RepositoryError>;
    /// Opens an all-or-nothing unit of work. Dropping it without
    /// [`AdmissionTransaction::commit`] discards every change.
    fn begin(&self) -> Result<Box<dyn AdmissionTransaction + '_>, RepositoryError>;
}

/// Mutation surface available inside a transaction.
pub trait AdmissionTransaction {
    fn find_by_id(&self, id: RecordId) -> Result<Option<AdmissionRecord>, RepositoryError>;
    /// Fails with [`RepositoryError::AmbiguousProgramKey`] when more than one record matches.
    fn find_by_program_key(&self, key: &str) -> Result<Option<AdmissionRecord>, RepositoryError>;
    fn insert(&mut self, program_key: &str, fields: &FieldSet) -> Result<RecordId, RepositoryError>;
    fn update_fields(&mut self, id: RecordId, fields: &FieldSet) -> Result<(), RepositoryError>;
    fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record {0} not found")]
    NotFound(RecordId),
    #[error("program key '{key}' matches {matches} records")]
    AmbiguousProgramKey { key: String, matches: usize },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

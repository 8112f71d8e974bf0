use std::sync::Arc;

use tracing::{info, warn};

use super::domain::AdmissionListing;
use super::edits::{BatchEditSummary, EditError, FieldEdit};
use super::reconcile::{ReconciliationImporter, ReconciliationReport};
use super::repository::{AdmissionRepository, ListingFilter};
use super::snapshot::{export_csv, ExportError, ImportError, UnknownHeaderPolicy};

/// Administrative operations over the admission-statistics table.
pub struct AdmissionAdminService<R> {
    repository: Arc<R>,
    importer: ReconciliationImporter<R>,
}

impl<R> AdmissionAdminService<R>
where
    R: AdmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_header_policy(repository, UnknownHeaderPolicy::default())
    }

    pub fn with_header_policy(repository: Arc<R>, policy: UnknownHeaderPolicy) -> Self {
        let importer = ReconciliationImporter::new(repository.clone()).with_header_policy(policy);
        Self {
            repository,
            importer,
        }
    }

    /// Joined listing in id order, as shown in the admin table.
    pub fn records(&self) -> Result<Vec<AdmissionListing>, EditError> {
        Ok(self.repository.list_joined(&ListingFilter::ordered_by_id())?)
    }

    /// Applies one cell change; a disallowed column rejects the request.
    pub fn edit_field(&self, edit: &FieldEdit) -> Result<(), EditError> {
        let Some((column, fields)) = edit.field_set() else {
            warn!(column = %edit.column, id = %edit.id, "rejected edit of non-editable column");
            return Err(EditError::UnknownColumn(edit.column.clone()));
        };

        let mut transaction = self.repository.begin()?;
        transaction.update_fields(edit.id, &fields)?;
        transaction.commit()?;

        info!(id = %edit.id, %column, "admission record field updated");
        Ok(())
    }

    /// Applies every allow-listed edit as one unit; disallowed columns are skipped.
    pub fn edit_batch(&self, edits: &[FieldEdit]) -> Result<BatchEditSummary, EditError> {
        let mut transaction = self.repository.begin()?;
        let mut summary = BatchEditSummary {
            applied: 0,
            skipped: 0,
        };

        for edit in edits {
            match edit.field_set() {
                Some((_, fields)) => {
                    transaction.update_fields(edit.id, &fields)?;
                    summary.applied += 1;
                }
                None => summary.skipped += 1,
            }
        }

        transaction.commit()?;
        info!(
            applied = summary.applied,
            skipped = summary.skipped,
            "admission batch edit committed"
        );
        Ok(summary)
    }

    pub fn export_csv(&self) -> Result<Vec<u8>, ExportError> {
        let listings = self.repository.list_joined(&ListingFilter::ordered_by_id())?;
        info!(rows = listings.len(), "exporting admission snapshot");
        export_csv(&listings)
    }

    pub fn import_csv(&self, bytes: &[u8]) -> Result<ReconciliationReport, ImportError> {
        self.importer.import_csv(bytes)
    }
}

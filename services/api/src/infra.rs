use admission_engine::admissions::InMemoryAdmissionStore;
use admission_engine::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Opens the admission store, seeded from a snapshot CSV when one is configured.
pub(crate) fn load_store(snapshot: Option<&Path>) -> Result<InMemoryAdmissionStore, AppError> {
    let Some(path) = snapshot else {
        warn!("no admission snapshot configured; starting with an empty table");
        return Ok(InMemoryAdmissionStore::new());
    };

    let file = File::open(path)?;
    let store = InMemoryAdmissionStore::load_snapshot(BufReader::new(file))?;
    info!(path = %path.display(), "admission snapshot loaded");
    Ok(store)
}

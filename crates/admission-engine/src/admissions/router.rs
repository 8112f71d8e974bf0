use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::edits::FieldEdit;
use super::repository::AdmissionRepository;
use super::service::AdmissionAdminService;
use crate::error::AppError;

pub const EXPORT_FILE_NAME: &str = "admission_statistics_export.csv";

/// Router builder exposing the administrative table, edits, export and import.
pub fn admin_router<R>(service: Arc<AdmissionAdminService<R>>) -> Router
where
    R: AdmissionRepository + 'static,
{
    Router::new()
        .route("/api/v1/admin/records", get(records_handler::<R>))
        .route("/api/v1/admin/records/field", post(edit_field_handler::<R>))
        .route("/api/v1/admin/records/batch", post(edit_batch_handler::<R>))
        .route("/api/v1/admin/export", get(export_handler::<R>))
        .route("/api/v1/admin/import", post(import_handler::<R>))
        .with_state(service)
}

pub(crate) async fn records_handler<R>(
    State(service): State<Arc<AdmissionAdminService<R>>>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    match service.records() {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn edit_field_handler<R>(
    State(service): State<Arc<AdmissionAdminService<R>>>,
    axum::Json(edit): axum::Json<FieldEdit>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    match service.edit_field(&edit) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "status": "ok" }))).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn edit_batch_handler<R>(
    State(service): State<Arc<AdmissionAdminService<R>>>,
    axum::Json(edits): axum::Json<Vec<FieldEdit>>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    match service.edit_batch(&edits) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<AdmissionAdminService<R>>>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    match service.export_csv() {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={EXPORT_FILE_NAME}"),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<AdmissionAdminService<R>>>,
    body: Bytes,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        let payload = json!({ "error": "no CSV data received" });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    match service.import_csv(&body) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

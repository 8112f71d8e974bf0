use crate::admissions::{EditError, ExportError, ImportError, RepositoryError};
use crate::config::ConfigError;
use crate::eligibility::{EligibilityError, ScoreError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Score(ScoreError),
    Edit(EditError),
    Import(ImportError),
    Export(ExportError),
    Repository(RepositoryError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Score(err) => write!(f, "invalid score: {}", err),
            AppError::Edit(err) => write!(f, "edit rejected: {}", err),
            AppError::Import(err) => write!(f, "import failed: {}", err),
            AppError::Export(err) => write!(f, "export failed: {}", err),
            AppError::Repository(err) => write!(f, "storage error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Score(err) => Some(err),
            AppError::Edit(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Repository(err) => Some(err),
        }
    }
}

impl AppError {
    /// HTTP status for this error, shared by every router and the CLI.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Score(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Edit(EditError::UnknownColumn(_)) => StatusCode::BAD_REQUEST,
            AppError::Import(
                ImportError::Csv(_) | ImportError::UnknownHeaders(_) | ImportError::Io(_),
            ) => StatusCode::BAD_REQUEST,
            AppError::Edit(EditError::Repository(err))
            | AppError::Import(ImportError::Repository(err))
            | AppError::Export(ExportError::Repository(err))
            | AppError::Repository(err) => repository_status(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
        RepositoryError::AmbiguousProgramKey { .. } => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ScoreError> for AppError {
    fn from(value: ScoreError) -> Self {
        Self::Score(value)
    }
}

impl From<EditError> for AppError {
    fn from(value: EditError) -> Self {
        Self::Edit(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<EligibilityError> for AppError {
    fn from(value: EligibilityError) -> Self {
        match value {
            EligibilityError::Score(err) => Self::Score(err),
            EligibilityError::Repository(err) => Self::Repository(err),
        }
    }
}

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use super::matching::MatchQuery;
use super::service::EligibilityService;
use super::weighted::WeightedCriteria;
use crate::admissions::AdmissionRepository;
use crate::error::AppError;

/// Router builder exposing candidate-facing eligibility queries.
pub fn eligibility_router<R>(service: Arc<EligibilityService<R>>) -> Router
where
    R: AdmissionRepository + 'static,
{
    Router::new()
        .route("/api/v1/eligibility/matches", post(matches_handler::<R>))
        .route("/api/v1/eligibility/random", post(random_handler::<R>))
        .route("/api/v1/eligibility/weighted", post(weighted_handler::<R>))
        .route("/api/v1/eligibility/facets", get(facets_handler::<R>))
        .with_state(service)
}

pub(crate) async fn matches_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
    axum::Json(query): axum::Json<MatchQuery>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    match service.matches(&query) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn random_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
    axum::Json(query): axum::Json<MatchQuery>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    let picked = {
        let mut rng = rand::thread_rng();
        service.pick_random(&query, &mut rng)
    };

    match picked {
        Ok(Some(result)) => (StatusCode::OK, axum::Json(result)).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn weighted_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
    axum::Json(criteria): axum::Json<WeightedCriteria>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    match service.weighted_ranking(&criteria) {
        Ok(ranking) => (StatusCode::OK, axum::Json(ranking)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn facets_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    match service.facets() {
        Ok(facets) => (StatusCode::OK, axum::Json(facets)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

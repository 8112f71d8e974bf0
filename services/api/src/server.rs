use crate::cli::ServeArgs;
use crate::infra::{load_store, AppState};
use crate::routes::with_admission_routes;
use admission_engine::admissions::AdmissionAdminService;
use admission_engine::config::AppConfig;
use admission_engine::eligibility::EligibilityService;
use admission_engine::error::AppError;
use admission_engine::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(load_store(config.data.snapshot_path.as_deref())?);
    let eligibility = Arc::new(EligibilityService::new(repository.clone()));
    let admin = Arc::new(AdmissionAdminService::with_header_policy(
        repository,
        config.data.header_policy,
    ));

    let app = with_admission_routes(eligibility, admin)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, header_policy = ?config.data.header_policy, "admission service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

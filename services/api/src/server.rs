use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_placement_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use internship_hub::config::AppConfig;
use internship_hub::error::AppError;
use internship_hub::storage::CsvStore;
use internship_hub::telemetry;
use internship_hub::workflows::placement::PlacementService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Command-line flags win over the environment.
fn apply_overrides(config: &mut AppConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }
}

fn build_app(config: &AppConfig, readiness: Arc<AtomicBool>) -> Result<Router, AppError> {
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let app_state = AppState {
        readiness,
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(CsvStore::open(&config.storage.data_dir)?);
    let service = PlacementService::open(store, config.policy.clone())?;

    Ok(with_placement_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer))
}

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config, args);
    telemetry::init(&config.telemetry)?;

    let readiness = Arc::new(AtomicBool::new(false));
    let app = build_app(&config, readiness.clone())?;

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.storage.data_dir.display(),
        "internship placement hub ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

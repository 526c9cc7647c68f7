use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState, BackendSummary};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use webhub_careers::config::AppConfig;
use webhub_careers::error::AppError;
use webhub_careers::telemetry;
use webhub_careers::workflows::careers::ErrorExposure;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let service = Arc::new(build_service(&config)?);
    let backends = BackendSummary {
        email: service.mail_backend(),
        store: service.store_backend(),
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        backends,
    };

    let exposure = ErrorExposure::for_environment(config.environment);
    let app = with_application_routes(service, exposure)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = ?config.environment,
        %addr,
        email = backends.email,
        store = backends.store,
        recipient = %config.mail.recipient,
        "careers intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

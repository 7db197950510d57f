use crate::cli::ServeArgs;
use crate::infra::{seed_personas, AppState, InMemoryAidStore, InMemoryAuditLog, LoggingBankGateway};
use crate::routes::with_aid_routes;
use aidlink::config::AppConfig;
use aidlink::error::AppError;
use aidlink::telemetry;
use aidlink::workflows::aid::AidService;
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

    let store = Arc::new(InMemoryAidStore::default());
    seed_personas(&store);
    let audit = Arc::new(InMemoryAuditLog::default());
    let gateway = Arc::new(LoggingBankGateway);
    let aid_service = Arc::new(AidService::new(
        store,
        audit,
        gateway,
        config.screening.policy(),
    ));

    let app = with_aid_routes(aid_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "aid disbursement service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

//! Metrics HTTP endpoint
//!
//! `GET /metrics` and `GET /` run one collection pass each. Anything else is
//! a 404.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::core::shutdown::ShutdownCoordinator;
use crate::metrics::collector::Collector;
use crate::metrics::emitter::TEXT_CONTENT_TYPE;
use crate::metrics::error::{MetricsError, MetricsResult};

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        log::error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
    }
}

/// Routes served by the exporter
pub fn router(collector: Arc<Collector>) -> Router {
    Router::new()
        .route("/", get(metrics_handler))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found)
        .with_state(collector)
}

async fn metrics_handler(
    State(collector): State<Arc<Collector>>,
) -> Result<impl IntoResponse, MetricsError> {
    let body = collector.collect().await?;
    Ok(([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Bind the listener and serve until shutdown is requested
pub async fn serve(
    listen_address: &str,
    listen_port: u16,
    collector: Arc<Collector>,
    shutdown: &ShutdownCoordinator,
) -> MetricsResult<()> {
    let address = format!("{}:{}", listen_address, listen_port);
    let listener = TcpListener::bind((listen_address, listen_port))
        .await
        .map_err(|source| MetricsError::Bind {
            address: address.clone(),
            source,
        })?;

    match listener.local_addr() {
        Ok(local) => log::info!("Service started, listening on {}", local),
        Err(_) => log::info!("Service started, listening on {}", address),
    }

    axum::serve(listener, router(collector))
        .with_graceful_shutdown(shutdown.wait())
        .await
        .map_err(|e| MetricsError::Serve {
            message: e.to_string(),
        })
}

use crate::health::{ChainStats, Classification, HealthMonitor};
use crate::metrics::{ChainMetricsSnapshot, MetricsRegistry};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::FutureExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(health_status, metrics),
    components(
        schemas(ChainStatsResponse, MetricsResponse, ErrorResponse)
    ),
    tags(
        (name = "Relayer Status API", description = "Chain liveness and relay counters")
    )
)]
pub struct ApiDoc;

#[derive(Debug, Serialize, ToSchema)]
pub struct ChainStatsResponse {
    pub data: ChainStats,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MetricsResponse {
    pub data: BTreeMap<String, ChainMetricsSnapshot>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Read-only status endpoints for the relayer's monitored chains.
#[derive(Clone)]
pub struct HealthApi {
    monitor: Arc<HealthMonitor>,
    metrics: Arc<MetricsRegistry>,
}

impl HealthApi {
    pub fn new(monitor: Arc<HealthMonitor>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { monitor, metrics }
    }

    pub async fn serve(
        self,
        bind_address: &str,
        shutdown: tokio::sync::oneshot::Receiver<()>,
    ) -> anyhow::Result<()> {
        let addr: SocketAddr = bind_address.parse()?;
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Starting status server on {}", addr);
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown.map(|v| {
                _ = v.inspect_err(|_err| error!("shutdown receive error"));
            }))
            .await?;
        Ok(())
    }

    pub fn router(&self) -> Router {
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .route("/health/{chain}", get(health_status))
            .route("/metrics", get(metrics))
            .layer(CorsLayer::permissive())
            .with_state(self.clone())
    }
}

#[utoipa::path(
    get,
    path = "/health/{chain}",
    params(
        ("chain" = String, Path, description = "Configured chain name")
    ),
    responses(
        (status = 200, description = "Chain is healthy", body = ChainStatsResponse),
        (status = 404, description = "Unknown chain name", body = ErrorResponse),
        (status = 500, description = "Chain is stale or regressed", body = ErrorResponse)
    )
)]
async fn health_status(
    State(state): State<HealthApi>,
    Path(chain): Path<String>,
) -> impl IntoResponse {
    let Some(source) = state.monitor.source(&chain) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "invalid chain name".to_owned(),
            }),
        ));
    };

    let observation = source.latest_block();
    match state.monitor.classify(&chain, observation) {
        Classification::Healthy(stats) => Ok(Json(ChainStatsResponse { data: stats })),
        Classification::NotFound => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "invalid chain name".to_owned(),
            }),
        )),
        Classification::Stale {
            chain_id,
            elapsed_secs,
            height,
        } => {
            warn!(%chain_id, elapsed_secs, "chain height is not moving");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!(
                        "chain height hasn't changed for {elapsed_secs} seconds (current height {height})"
                    ),
                }),
            ))
        }
        Classification::Regression { previous, current } => {
            error!(%chain, %previous, %current, "block height moved backwards");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!(
                        "unexpected block height: previous {previous}, current {current}"
                    ),
                }),
            ))
        }
    }
}

#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Relay counters for every configured chain", body = MetricsResponse)
    )
)]
async fn metrics(State(state): State<HealthApi>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        data: state.metrics.snapshot(),
    })
}

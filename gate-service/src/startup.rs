use crate::config::GateConfig;
use crate::handlers;
use axum::{
    http::{header, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use secrecy::Secret;
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct GateState {
    pub internal_password: Arc<Secret<String>>,
}

impl GateState {
    pub fn new(internal_password: Secret<String>) -> Self {
        Self {
            internal_password: Arc::new(internal_password),
        }
    }
}

/// Browsers may call the endpoint from any origin; the layer also answers
/// OPTIONS preflights before they reach the 405 fallback.
fn check_password_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_router(state: GateState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/check-password",
            post(handlers::check_password)
                .fallback(handlers::method_not_allowed)
                .layer(check_password_cors()),
        )
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: GateConfig) -> Result<Self, AppError> {
        let state = GateState::new(config.internal_password);
        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

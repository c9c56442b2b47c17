use crate::config::{CatalogBackend, Settings};
use crate::error::PortalError;
use crate::handlers;
use crate::services::{
    AccessGate, AdminEditor, AdminGate, CatalogRepository, CatalogStore, GateClient,
    InMemoryCatalog, LocalObjectStore, MongoCatalog, ObjectStore, SecretVerifier,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware,
};
use std::future::IntoFuture;
use std::path::PathBuf;
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Admin requests carry up to one thumbnail and one document plus form text.
const ADMIN_BODY_LIMIT: usize = 51 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub gate: Arc<AccessGate>,
    pub admin_gate: Arc<AdminGate>,
    pub editor: Arc<AdminEditor>,
    /// Present when the catalog lives in MongoDB, for readiness checks.
    pub mongo: Option<MongoCatalog>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn CatalogRepository>,
        storage: Arc<dyn ObjectStore>,
        verifier: Box<dyn SecretVerifier>,
        admin_gate: AdminGate,
    ) -> Self {
        let catalog = Arc::new(CatalogStore::new(repository));
        let editor = Arc::new(AdminEditor::new(catalog.clone(), storage));

        Self {
            catalog,
            gate: Arc::new(AccessGate::new(verifier)),
            admin_gate: Arc::new(admin_gate),
            editor,
            mongo: None,
        }
    }
}

pub fn build_router(state: AppState, files_dir: impl Into<PathBuf>, session_idle: Duration) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false) // Set to true in production with HTTPS
        .with_expiry(Expiry::OnInactivity(session_idle));

    let admin_routes = Router::new()
        .route("/api/admin/login", post(handlers::admin_login))
        .route("/api/admin/logout", post(handlers::admin_logout))
        .route("/api/admin/documents", post(handlers::create_document))
        .route(
            "/api/admin/documents/:id",
            delete(handlers::delete_document).put(handlers::update_document),
        )
        .route("/api/admin/uploads/:class", post(handlers::upload_file))
        .layer(DefaultBodyLimit::max(ADMIN_BODY_LIMIT));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/api/session",
            get(handlers::get_session).patch(handlers::update_session),
        )
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/catalog", get(handlers::get_catalog))
        .route("/api/documents/:id/download", get(handlers::download_document))
        .route("/api/gate/internal", post(handlers::unlock_internal))
        .route("/api/gate/internal/lock", post(handlers::lock_internal))
        .merge(admin_routes)
        .nest_service("/files", ServeDir::new(files_dir.into()))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

async fn build_repository(
    settings: &Settings,
) -> Result<(Arc<dyn CatalogRepository>, Option<MongoCatalog>), PortalError> {
    match settings.catalog.backend {
        CatalogBackend::Mongodb => {
            let uri = settings.catalog.mongodb_uri.as_deref().ok_or_else(|| {
                PortalError::Catalog(anyhow::anyhow!(
                    "catalog.mongodb_uri is required for the mongodb backend"
                ))
            })?;
            let mongo = MongoCatalog::connect(uri, &settings.catalog.database).await?;
            mongo.initialize_indexes().await?;
            Ok((Arc::new(mongo.clone()), Some(mongo)))
        }
        CatalogBackend::Memory => {
            let repository = match &settings.catalog.seed_path {
                Some(path) => InMemoryCatalog::from_seed_file(path).await?,
                None => InMemoryCatalog::default(),
            };
            Ok((Arc::new(repository), None))
        }
    }
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let (repository, mongo) = build_repository(&settings).await.map_err(|e| {
            tracing::error!("Failed to initialize catalog: {}", e);
            AppError::from(e)
        })?;

        let storage = LocalObjectStore::new(
            &settings.storage.local_path,
            &settings.storage.public_base_url,
        )
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to initialize local storage at {}: {}",
                settings.storage.local_path,
                e
            );
            AppError::from(e)
        })?;

        let gate_client = GateClient::new(&settings.gate).map_err(AppError::from)?;

        let mut state = AppState::new(
            repository,
            Arc::new(storage),
            Box::new(gate_client),
            AdminGate::new(settings.admin.passphrase.clone()),
        );
        state.mongo = mongo;

        // Warm the cache; an unreachable backend is retried on first read.
        if let Err(e) = state.catalog.reload().await {
            tracing::warn!("Initial catalog load failed: {}", e);
        }

        let app = build_router(
            state.clone(),
            &settings.storage.local_path,
            Duration::hours(settings.server.session_idle_hours),
        );

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

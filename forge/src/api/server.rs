//! REST API server implementation

use crate::api::middleware::cors_layer;
use crate::api::routes;
use crate::config::ForgeConfig;
use crate::services::{
    AuthService, CollaboratorService, GitSyncService, LocalGitGateway, ProjectService,
    PullRequestService,
};
use anyhow::{Context, Result};
use axum::Router;
use forge_core::GitGateway;
use forge_storage::ForgeStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context handed to every route group
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<ForgeStore>,
    pub auth: Arc<AuthService>,
    pub projects: Arc<ProjectService>,
    pub collaborators: Arc<CollaboratorService>,
    pub pull_requests: Arc<PullRequestService>,
    pub git: Arc<GitSyncService>,
    pub start_time: Instant,
}

impl AppContext {
    /// Wire up the full service graph from configuration.
    pub fn new(config: &ForgeConfig) -> Self {
        let gateway: Arc<dyn GitGateway> = Arc::new(LocalGitGateway::new(
            config.git.repos_root.clone(),
            Duration::from_secs(config.git.operation_timeout_secs),
        ));
        Self::with_gateway(config, gateway)
    }

    /// Wire up the service graph with a caller-supplied gateway.
    pub fn with_gateway(config: &ForgeConfig, gateway: Arc<dyn GitGateway>) -> Self {
        let store = Arc::new(ForgeStore::new());
        let policy = config.access;

        let auth = Arc::new(AuthService::new(
            store.clone(),
            config.auth.jwt_secret.clone(),
            config.auth.access_token_expiry_minutes,
        ));
        let projects = Arc::new(ProjectService::new(store.clone(), policy));
        let collaborators = Arc::new(CollaboratorService::new(store.clone(), policy));
        let pull_requests = Arc::new(PullRequestService::new(
            store.clone(),
            gateway.clone(),
            policy,
        ));
        let git = Arc::new(GitSyncService::new(store.clone(), gateway));

        Self {
            store,
            auth,
            projects,
            collaborators,
            pull_requests,
            git,
            start_time: Instant::now(),
        }
    }
}

/// Build the application router
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .merge(routes::auth::router())
        .merge(routes::projects::router())
        .merge(routes::public::router())
        .merge(routes::collaborators::router())
        .merge(routes::pull_requests::router())
        .merge(routes::git::router())
        .merge(routes::health::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(ctx)
}

/// REST API server
pub struct ApiServer {
    config: ForgeConfig,
    ctx: AppContext,
}

impl ApiServer {
    pub fn new(config: ForgeConfig) -> Self {
        let ctx = AppContext::new(&config);
        Self { config, ctx }
    }

    /// Start serving until the process is stopped
    pub async fn serve(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.server.address, self.config.server.port);
        let socket_addr: SocketAddr = addr.parse().context("Failed to parse socket address")?;

        let app = build_router(self.ctx);

        let listener = tokio::net::TcpListener::bind(&socket_addr)
            .await
            .context("Failed to bind to address")?;

        info!("Forge API listening on http://{}", addr);
        axum::serve(listener, app)
            .await
            .context("Server terminated unexpectedly")?;
        Ok(())
    }
}

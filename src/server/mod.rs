// HTTP server
//
// Single-process JSON API: one request per question, no server-side
// session. Each request reads the content store and the credential afresh.

mod error;
mod handlers;

pub use error::{ApiError, ErrorBody, JsonResponse};
pub use handlers::{
    create_router, handle_chat, handle_get_unit, handle_list_subjects, health_check,
    SubjectSummary, UnitDetail, UnitSummary,
};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::constants::MAX_REQUEST_BODY_BYTES;
use crate::config::{Config, CredentialSource};
use crate::logging::PromptLog;
use crate::providers::{LlmProvider, OpenAIProvider};

/// Shared, immutable per-process state handed to every handler.
pub struct AppState {
    content_path: PathBuf,
    credentials: CredentialSource,
    provider: Arc<dyn LlmProvider>,
    expose_error_details: bool,
}

impl AppState {
    /// Wire the production provider (with prompt audit log) from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut provider = OpenAIProvider::new(&config.openai)?;
        if config.content.audit_log_enabled {
            provider = provider.with_prompt_log(PromptLog::new(&config.content.log_dir));
        }

        Ok(Self::new(
            config.content.path.clone(),
            CredentialSource::from(&config.openai),
            Arc::new(provider),
        )
        .with_error_details(config.server.expose_error_details))
    }

    pub fn new(
        content_path: impl Into<PathBuf>,
        credentials: CredentialSource,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            content_path: content_path.into(),
            credentials,
            provider,
            expose_error_details: false,
        }
    }

    /// Attach gateway diagnostics to 500 responses
    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }

    pub fn content_path(&self) -> &Path {
        &self.content_path
    }

    pub fn credentials(&self) -> &CredentialSource {
        &self.credentials
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn expose_error_details(&self) -> bool {
        self.expose_error_details
    }
}

/// Build the full application: routes plus body limit and request tracing.
pub fn build_app(state: Arc<AppState>) -> axum::Router {
    create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(axum::extract::DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES)),
    )
}

/// The tutor HTTP server
pub struct TutorServer {
    bind_address: String,
    state: Arc<AppState>,
}

impl TutorServer {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            bind_address: config.server.bind_address.clone(),
            state: Arc::new(AppState::from_config(config)?),
        })
    }

    /// Start the HTTP server and run until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address {}", self.bind_address))?;

        let app = build_app(Arc::clone(&self.state));

        if self.state.credentials.current().is_none() {
            tracing::warn!(
                "{} is not set; answers will use the offline fallback until it is",
                self.state.credentials.label()
            );
        }
        tracing::info!(
            content = %self.state.content_path.display(),
            model = self.state.provider.model(),
            "Starting tutor server on {}",
            addr
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

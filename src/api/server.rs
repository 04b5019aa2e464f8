//! Ratio Forge API Server implementation
//!
//! HTTP REST API server using Axum. Stateless analysis plus session-scoped
//! analysis, commentary and chat.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers;
use super::sessions::SessionStore;
use crate::config::Settings;
use crate::narrative::{GeminiClient, NarrativeClient};
use crate::types::AnalysisOptions;

/// API Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub version: String,
    /// Deployment profile; requests may pick the header mode but never the policy
    pub options: AnalysisOptions,
    pub sessions: SessionStore,
    pub narrator: Option<Arc<dyn NarrativeClient>>,
}

impl AppState {
    pub fn new(options: AnalysisOptions, narrator: Option<Arc<dyn NarrativeClient>>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            options,
            sessions: SessionStore::new(),
            narrator,
        }
    }

    /// Build state from settings; narrative endpoints stay disabled without an API key
    pub fn from_settings(settings: &Settings) -> Self {
        let narrator: Option<Arc<dyn NarrativeClient>> = if settings.narrative.is_configured() {
            match GeminiClient::new(&settings.narrative) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!(error = %e, "narrative client disabled");
                    None
                }
            }
        } else {
            warn!("no narrative API key configured; commentary and chat endpoints are disabled");
            None
        };
        Self::new(settings.profile.options(), narrator)
    }
}

/// Build the router with all endpoints and middleware
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Stateless analysis
        .route("/api/v1/analyze", post(handlers::analyze))
        // Sessions
        .route("/api/v1/sessions", post(handlers::create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/v1/sessions/:id/table", post(handlers::upload_table))
        .route("/api/v1/sessions/:id/commentary", post(handlers::commentary))
        .route("/api/v1/sessions/:id/messages", post(handlers::ask))
        // State and middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(settings: Settings) -> anyhow::Result<()> {
    let config = settings.server.clone();
    let state = Arc::new(AppState::from_settings(&settings));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Ratio Forge API Server starting on http://{}", addr);
    info!(
        "   Policy: {}, Endpoints: /api/v1/analyze, /api/v1/sessions",
        settings.profile.total_assets_policy
    );
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Ratio Forge API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ApiConfig Tests ====================

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_config_address_format() {
        let config = ApiConfig {
            host: "192.168.1.100".to_string(),
            port: 9090,
        };
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse().unwrap();
        assert_eq!(addr.port(), 9090);
    }

    // ==================== AppState Tests ====================

    #[test]
    fn test_state_without_api_key_has_no_narrator() {
        let state = AppState::from_settings(&Settings::default());
        assert!(state.narrator.is_none());
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_state_with_api_key_has_narrator() {
        let mut settings = Settings::default();
        settings.narrative.api_key = Some("key".to_string());
        let state = AppState::from_settings(&settings);
        assert!(state.narrator.is_some());
    }
}

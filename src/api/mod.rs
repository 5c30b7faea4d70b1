//! HTTP API server for the FocusMate gateway

pub mod gateway;
pub mod health;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::response::Html;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::clients::{self, GenerationClient, SynthesisClient, TranscriptionClient};
use crate::{Config, Result};

/// Single-page UI compiled into the binary
pub const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared state for API handlers
///
/// Immutable after startup; each request gets its own outbound connections.
#[derive(Clone)]
pub struct ApiState {
    pub generation: GenerationClient,
    pub synthesis: SynthesisClient,
    pub transcription: TranscriptionClient,
}

impl ApiState {
    /// Build the three service clients from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built or a key is empty
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = clients::http_client(config.server.insecure_tls)?;
        let timeout = config.server.timeout;

        let mut generation =
            GenerationClient::new(http.clone(), config.api_keys.gemini.clone())?.timeout(timeout);
        if let Some(model) = &config.generation.model {
            generation = generation.model(model.as_str());
        }
        if let Some(url) = &config.generation.base_url {
            generation = generation.base_url(url.as_str());
        }

        let mut synthesis =
            SynthesisClient::new(http.clone(), config.api_keys.tts.clone())?.timeout(timeout);
        if let Some(language) = &config.voice.language_code {
            synthesis = synthesis.language_code(language.as_str());
        }
        if let Some(name) = &config.voice.name {
            synthesis = synthesis.voice_name(name.as_str());
        }
        if let Some(url) = &config.voice.tts_base_url {
            synthesis = synthesis.base_url(url.as_str());
        }

        let mut transcription =
            TranscriptionClient::new(http, config.api_keys.stt.clone())?.timeout(timeout);
        if let Some(language) = &config.voice.stt_language_code {
            transcription = transcription.language_code(language.as_str());
        }
        if let Some(url) = &config.voice.stt_base_url {
            transcription = transcription.base_url(url.as_str());
        }

        Ok(Self {
            generation,
            synthesis,
            transcription,
        })
    }
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    state: Arc<ApiState>,
    bind: String,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(state: ApiState, port: u16) -> Self {
        Self {
            state: Arc::new(state),
            bind: crate::config::DEFAULT_BIND.to_string(),
            port,
            static_dir: None,
        }
    }

    /// Set the bind address
    #[must_use]
    pub fn bind(mut self, bind: String) -> Self {
        self.bind = bind;
        self
    }

    /// Set the static files directory for serving the web UI
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        ApiServer {
            state: self.state,
            bind: self.bind,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    bind: String,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(gateway::router(self.state.clone()))
            .merge(health::router());

        // Serve static files if configured, the embedded page otherwise
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        } else {
            router = router.route("/", get(|| async { Html(INDEX_HTML) }));
        }

        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.bind, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server on {addr}: {e}")))?;

        tracing::info!(addr = %addr, "API server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "failed to listen for shutdown signal");
                    std::future::pending::<()>().await;
                }
                tracing::info!("shutting down");
            })
            .await?;

        Ok(())
    }
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up the middleware pipeline in its fixed order
//! - Register versioned API routes under the configured prefix
//! - Bind the server to a listener (plain TCP or TLS)
//! - Graceful shutdown on Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::CredentialStore;
use crate::config::{AppConfig, TlsConfig};
use crate::http::handlers::{
    create_checkout, get_horoscope, get_numerology, get_report, health,
};
use crate::http::middleware::auth::auth_middleware;
use crate::http::middleware::error_envelope::error_envelope_middleware;
use crate::http::middleware::query_observer::query_observer_middleware;
use crate::http::middleware::request_id::request_id_middleware;
use crate::http::middleware::security_headers::security_headers_middleware;
use crate::http::middleware::version::version_middleware;

/// Application state injected into middleware and handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(config: AppConfig, keys: Arc<dyn CredentialStore>) -> Self {
        Self {
            config: Arc::new(config),
            keys,
        }
    }
}

/// HTTP server for the API.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and key store.
    pub fn new(config: AppConfig, keys: Arc<dyn CredentialStore>) -> Self {
        let state = AppState::new(config, keys);
        let config = state.config.clone();
        let router = Self::build_router(config.as_ref(), state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layer registration is inside-out: the last `.layer` call runs first on
    /// the way in and last on the way out.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let api_routes = Router::new()
            .route("/horoscope/{sign}", get(get_horoscope))
            .route("/numerology/{number}", get(get_numerology))
            .route("/reports/{id}", get(get_report))
            .route("/payments/checkout", post(create_checkout));

        let mut router = Router::new().route("/health", get(health));
        for version in &config.api.supported_versions {
            router = router.nest(
                &format!("{}/v{}", config.api.prefix, version),
                api_routes.clone(),
            );
        }

        let mut router = router
            .with_state(state.clone())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size));

        if config.observability.diagnostic_mode {
            router = router.layer(middleware::from_fn(query_observer_middleware));
        }

        router
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .layer(middleware::from_fn_with_state(state.clone(), version_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(middleware::from_fn(error_envelope_middleware))
            .layer(middleware::from_fn_with_state(
                state,
                security_headers_middleware,
            ))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination.
    pub async fn run_tls(self, tls: &TlsConfig) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .listener
            .bind_address
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
        tracing::info!(address = %addr, "HTTPS server starting");

        axum_server::bind_rustls(addr, rustls)
            .serve(self.router.into_make_service())
            .await
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}

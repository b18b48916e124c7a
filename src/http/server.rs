//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the login and health handlers
//! - Wire up middleware (tracing, request ID)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::auth::LoginService;
use crate::config::ServiceConfig;
use crate::http::handlers::{health_handler, login_handler, AppState};
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown;
use crate::users_api::TokenMinter;

/// HTTP host for the login service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ServiceConfig, login: Arc<LoginService>) -> Self {
        let state = AppState {
            login,
            minter: TokenMinter::from_config(&config.jwt),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/login", post(login_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(propagate_request_id_layer()),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

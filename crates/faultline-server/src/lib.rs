//! axum integration for faultline errors
//!
//! Handlers return [`HandlerError`] (or `Result<_, HandlerError>`), and the
//! middleware stack assembled by [`Server`] turns every failure into a single
//! JSON error response carrying the request id.

mod boundary;
mod extract;
mod request_context;

use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;

use axum::Router;
use faultline_config::Config;
use http::{HeaderName, StatusCode};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use boundary::{
    AxumSink, HandlerError, emit, error_boundary_middleware, method_not_allowed_fallback, not_found_fallback,
    panic_response,
};
pub use extract::{JsonBody, PathParams};
pub use request_context::{ContextSettings, request_context_middleware};

/// Assembled server with application routes and the error boundary
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Wrap application routes with the error handling middleware
    ///
    /// # Errors
    ///
    /// Returns an error if the `[errors]` section names an invalid request id
    /// header, or if `routes` already serves the configured health path
    pub fn new(config: &Config, routes: Router) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let settings = ContextSettings::from_config(&config.errors)?;
        let request_id_header: HeaderName = settings.request_id_header.clone();

        let mut app = routes
            .fallback(not_found_fallback)
            .method_not_allowed_fallback(method_not_allowed_fallback);

        // Health check
        if config.server.health.enabled {
            app = mount_health(app, &config.server.health.path)?;
        }

        // Apply middleware layers (innermost first)

        // Panics become handler errors, so they must sit inside the boundary
        app = app.layer(CatchPanicLayer::custom(panic_response));

        app = app.layer(axum::middleware::from_fn(error_boundary_middleware));

        app = app.layer(axum::middleware::from_fn(move |req, next| {
            let settings = settings.clone();
            async move { request_context_middleware(settings, req, next).await }
        }));

        // Request id
        app = app.layer(PropagateRequestIdLayer::new(request_id_header.clone()));
        if config.errors.generate_request_id {
            app = app.layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid));
        }

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

// axum panics on overlapping routes, so a collision is caught and reported
fn mount_health(app: Router, path: &str) -> anyhow::Result<Router> {
    let health = axum::routing::get(|| async { (StatusCode::OK, "ok") });

    std::panic::catch_unwind(AssertUnwindSafe(move || app.route(path, health)))
        .map_err(|_| anyhow::anyhow!("health path '{path}' conflicts with an application route"))
}

//! HTTP host for the server: owns the middleware stack, the health check and
//! the listener. Feature modules contribute plain `axum::Router`s.

use std::net::SocketAddr;

use axum::{http::StatusCode, middleware::from_fn, routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod error;
pub mod problem;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use error::ApiIngressError;

/// Builds the final router and serves it.
pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Add `/health` to `routes` and wrap everything in the middleware stack.
    ///
    /// Layers are applied innermost first; on the way in a request passes
    /// SetRequestId -> PropagateRequestId -> Trace -> push_req_id -> Timeout
    /// -> CORS -> BodyLimit -> handler.
    pub fn build_router(&self, routes: Router) -> Router {
        tracing::debug!("Building router");
        let mut router = routes.route("/health", get(web::health_check));

        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            self.config.request_timeout(),
        ));

        // Runs inside the trace span so the id lands on it
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = request_id::with_trace_layer(router);

        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind and serve `router` until `cancel` fires, then drain gracefully.
    pub async fn serve(&self, router: Router, cancel: CancellationToken) -> Result<(), ApiIngressError> {
        let addr: SocketAddr =
            self.config
                .bind_addr
                .parse()
                .map_err(|source| ApiIngressError::InvalidBindAddr {
                    addr: self.config.bind_addr.clone(),
                    source,
                })?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

/// Cancel `token` on Ctrl-C or (on Unix) SIGTERM.
pub fn cancel_on_signals(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut s) => {
                    s.recv().await;
                }
                Err(e) => {
                    tracing::error!("Failed to listen for SIGTERM: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Ctrl-C received"),
            _ = terminate => tracing::info!("SIGTERM received"),
        }
        token.cancel();
    });
}

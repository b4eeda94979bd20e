//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, body limit)
//! - Serve on a bound listener until shutdown
//! - Apply reloaded upstream settings without dropping connections

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Json, Router,
};
use arc_swap::ArcSwap;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::gateway::{proxy_handler, Upstream};
use crate::http::request::assign_request_id;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<ArcSwap<Upstream>>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    upstream: Arc<ArcSwap<Upstream>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let upstream = Arc::new(ArcSwap::from_pointee(Upstream::from_config(&config)?));

        let state = AppState {
            upstream: upstream.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            upstream,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let body_limit = match config.limits.max_body_bytes {
            Some(max) => DefaultBodyLimit::max(max),
            None => DefaultBodyLimit::disable(),
        };

        Router::new()
            .route(
                "/api/{*path}",
                get(proxy_handler)
                    .post(proxy_handler)
                    .put(proxy_handler)
                    .patch(proxy_handler)
                    .delete(proxy_handler),
            )
            .route("/healthz", get(healthz))
            .with_state(state)
            .layer(body_limit)
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(assign_request_id))
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs received on `config_updates` replace the upstream snapshot;
    /// the server stops once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend_url = %self.config.upstream.backend_url,
            "HTTP server starting"
        );

        let reloader = tokio::spawn(apply_config_updates(
            self.upstream.clone(),
            self.config.clone(),
            config_updates,
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Consume the server and return its router.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Base URL requests are currently forwarded to.
    pub fn backend_url(&self) -> String {
        self.upstream.load().base_url().to_string()
    }
}

/// Swap in the upstream of every reloaded config.
async fn apply_config_updates(
    upstream: Arc<ArcSwap<Upstream>>,
    mut current: GatewayConfig,
    mut updates: mpsc::UnboundedReceiver<GatewayConfig>,
) {
    while let Some(next) = updates.recv().await {
        if next.listener != current.listener || next.limits != current.limits {
            tracing::warn!("Listener and limit changes take effect after a restart");
        }

        match Upstream::from_config(&next) {
            Ok(new_upstream) => {
                tracing::info!(
                    backend_url = %new_upstream.base_url(),
                    "Upstream configuration reloaded"
                );
                upstream.store(Arc::new(new_upstream));
                current = next;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build upstream client, keeping previous one");
            }
        }
    }
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn unreachable_config() -> GatewayConfig {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut config = GatewayConfig::default();
        config.upstream.backend_url = format!("http://127.0.0.1:{}", port);
        config
    }

    #[tokio::test]
    async fn healthz_is_served_locally() {
        let app = HttpServer::new(unreachable_config()).unwrap().into_router();

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn paths_outside_api_are_not_found() {
        let app = HttpServer::new(unreachable_config()).unwrap().into_router();

        let response = app
            .oneshot(Request::builder().uri("/notes/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected() {
        let app = HttpServer::new(unreachable_config()).unwrap().into_router();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/notes/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn head_is_proxied_through_get_route() {
        let app = HttpServer::new(unreachable_config()).unwrap().into_router();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::HEAD)
                    .uri("/api/notes/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Reached the proxy handler, which found no backend.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unreachable_backend_yields_fixed_error() {
        let app = HttpServer::new(unreachable_config()).unwrap().into_router();

        let response = app
            .oneshot(Request::builder().uri("/api/notes/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Failed to connect to backend"}"#);
    }

    #[tokio::test]
    async fn body_over_limit_is_rejected_before_forwarding() {
        let mut config = unreachable_config();
        config.limits.max_body_bytes = Some(8);
        let app = HttpServer::new(config).unwrap().into_router();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/notes/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"text":"far too long"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn reload_swaps_backend_url() {
        let server = HttpServer::new(unreachable_config()).unwrap();
        let upstream = server.upstream.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(apply_config_updates(upstream.clone(), server.config().clone(), rx));

        let mut next = server.config().clone();
        next.upstream.backend_url = "http://reloaded-backend:8000/".into();
        tx.send(next).unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(server.backend_url(), "http://reloaded-backend:8000");
    }
}

//! HTTP server setup and upstream forwarding.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (trace, timeout,
//!   response interception)
//! - Forward requests to the configured upstream backend
//! - Bind the server to a listener and serve until shutdown
//!
//! # Design Decisions
//! - Upstream responses are reattached as streams; the interception
//!   middleware decides whether a body may be buffered for rewriting
//! - A failed upstream connection maps to 502 Bad Gateway

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::middleware::{intercept_errors, InterceptSetupError, InterceptState};

/// Application state injected into the forwarding handler.
#[derive(Clone)]
pub struct AppState {
    client: Client<HttpConnector, Body>,
    upstream: Arc<str>,
}

/// HTTP server fronting one upstream with response interception.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration. Fails when
    /// the interception config (status ranges, rewrite regexes) is
    /// malformed.
    pub fn new(config: ProxyConfig) -> Result<Self, InterceptSetupError> {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let state = AppState {
            client,
            upstream: config.upstream.address.as_str().into(),
        };
        let intercept_state = InterceptState::from_config(&config.intercept)?;

        let router = Self::build_router(&config, state, intercept_state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &ProxyConfig,
        state: AppState,
        intercept_state: InterceptState,
    ) -> Router {
        Router::new()
            .route("/", any(forward_handler))
            .route("/{*path}", any(forward_handler))
            .layer(axum::middleware::from_fn_with_state(
                intercept_state,
                intercept_errors,
            ))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
            .with_state(state)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Forward a request to the upstream backend, preserving the path and
/// streaming the response body back.
async fn forward_handler(State(state): State<AppState>, request: Request) -> Response {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = match Authority::from_str(&state.upstream) {
        Ok(authority) => Some(authority),
        Err(err) => {
            tracing::error!(error = %err, upstream = %state.upstream, "invalid upstream authority");
            return (StatusCode::BAD_GATEWAY, "invalid upstream address").into_response();
        }
    };
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }

    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(err) => {
            tracing::error!(error = %err, "failed assembling upstream URI");
            return (StatusCode::BAD_GATEWAY, "invalid upstream URI").into_response();
        }
    };

    tracing::debug!(uri = %parts.uri, method = %parts.method, "forwarding to upstream");

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(err) => {
            tracing::error!(error = %err, "upstream request failed");
            (StatusCode::BAD_GATEWAY, "upstream request failed").into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}

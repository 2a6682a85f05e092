//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router covering the local prefix
//! - Wire up middleware (tracing, request ID)
//! - Serve plaintext or TLS listeners
//! - Forward requests to the upstream origin and rewrite responses
//! - Bound each upstream round trip; a slow upstream is a gateway error

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::forwarded::{
    append_forwarded_for, apply_forwarding_defaults, set_upstream_host, strip_hop_by_hop,
};
use crate::http::request::{inbound_host, rewrite_request, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::response::prepare_response;
use crate::rewrite::RewriteRules;

/// Client used to reach the upstream over HTTP or HTTPS.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// How long in-flight TLS connections may drain after shutdown is signalled.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rules: Arc<RewriteRules>,
    pub client: UpstreamClient,
    /// Scheme clients use to reach this listener.
    pub inbound_scheme: &'static str,
    /// Deadline for the upstream to answer with response headers.
    pub upstream_timeout: Duration,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server from configuration and prebuilt rewrite rules.
    pub fn new(config: ProxyConfig, rules: Arc<RewriteRules>) -> Self {
        let state = AppState {
            rules,
            client: build_client(&config),
            inbound_scheme: config.inbound_scheme(),
            upstream_timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let mut router: Router<AppState> = Router::new();
        for pattern in state.rules.local_prefix.route_patterns() {
            router = router.route(&pattern, any(proxy_handler));
        }

        router
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// Run a plaintext server on the given listener until shutdown is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run a TLS-terminating server on the given listener until shutdown is signalled.
    pub async fn run_tls(
        self,
        listener: TcpListener,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum_server::from_tcp_rustls(listener.into_std()?, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

fn build_client(config: &ProxyConfig) -> UpstreamClient {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);

    Client::builder(TokioExecutor::new()).build(https)
}

/// Main proxy handler.
/// Normalizes forwarding headers, rewrites the request, forwards it and
/// rewrites the response cookies.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (mut parts, body) = request.into_parts();
    let host = inbound_host(&parts);
    let inbound_path = parts.uri.path().to_string();
    let method = parts.method.clone();

    apply_forwarding_defaults(&mut parts.headers, &host, state.inbound_scheme);

    if let Err(e) = rewrite_request(&mut parts, &state.rules, &host) {
        tracing::error!(
            request_id = %request_id,
            path = %inbound_path,
            error = %e,
            "Failed to build upstream URI"
        );
        return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
    }

    set_upstream_host(&mut parts.headers, &state.rules.origin);
    strip_hop_by_hop(&mut parts.headers);
    append_forwarded_for(&mut parts.headers, client_addr.ip());
    parts.version = Version::HTTP_11;

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %inbound_path,
        upstream = %parts.uri,
        "Proxying request"
    );

    let upstream = state.client.request(Request::from_parts(parts, body));
    match tokio::time::timeout(state.upstream_timeout, upstream).await {
        Ok(Ok(response)) => {
            let (mut parts, body) = response.into_parts();
            prepare_response(&mut parts, &state.rules.cookie_domains);
            Response::from_parts(parts, Body::new(body))
        }
        Ok(Err(e)) => {
            tracing::error!(
                request_id = %request_id,
                path = %inbound_path,
                error = %e,
                "Upstream error"
            );
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
        Err(_) => {
            tracing::error!(
                request_id = %request_id,
                path = %inbound_path,
                timeout_secs = state.upstream_timeout.as_secs(),
                "Upstream timed out"
            );
            (StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out").into_response()
        }
    }
}

//! Plaintext listener that sends every request to the HTTPS port.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, uri::Authority, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct RedirectState {
    tls_port: u16,
}

/// Router answering every request with a `302 Found` to the HTTPS listener.
pub fn redirect_router(tls_port: u16) -> Router {
    Router::new()
        .fallback(redirect_handler)
        .with_state(RedirectState { tls_port })
        .layer(TraceLayer::new_for_http())
}

/// Serve the redirect router until shutdown is signalled.
pub async fn run_redirect_server(
    listener: TcpListener,
    tls_port: u16,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, tls_port, "HTTPS redirect server starting");

    axum::serve(listener, redirect_router(tls_port))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("HTTPS redirect server stopped");
    Ok(())
}

async fn redirect_handler(State(state): State<RedirectState>, request: Request) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok());
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let location = https_location(host, state.tls_port, path_and_query);
    tracing::info!(location = %location, "Redirecting to HTTPS");

    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .body(Body::empty())
        .unwrap_or_else(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Redirect failed").into_response())
}

/// HTTPS URL for a plaintext request: same host (port dropped, `localhost`
/// when unknown), the TLS port, and the original path and query.
pub fn https_location(host: Option<&str>, tls_port: u16, path_and_query: &str) -> String {
    let host = host
        .and_then(|h| h.parse::<Authority>().ok())
        .map(|a| a.host().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string());

    format!("https://{}:{}{}", host, tls_port, path_and_query)
}

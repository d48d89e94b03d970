//! Gate Controller — per-connection orchestration: classify, look up the
//! route, ensure the backend is running, then hand off to the Stream
//! Proxy (spec.md §4.7).

use std::time::Instant;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::admin;
use crate::classify::{self, Classified};
use crate::error::GateError;
use crate::health;
use crate::registry::container_name_for;
use crate::routes::Route;
use crate::state::SharedState;

/// Handle one accepted connection end to end. Never propagates an error
/// to the caller — every failure is turned into an HTTP response on the
/// client socket and the connection is closed (spec.md §7: "the process
/// never terminates on per-request errors").
pub async fn handle(state: SharedState, mut stream: TcpStream) {
    match route_connection(&state, &stream).await {
        Ok(Outcome::Handled(body)) => write_ok_json(&mut stream, &body).await,
        Ok(Outcome::Proxy(target)) => {
            if let Err(err) = ensure_running(&state, &target).await {
                write_error(&mut stream, &err).await;
                return;
            }
            if let Err(err) = crate::proxy::proxy(stream, target.port).await {
                tracing::warn!(group = target.group, error = %err, "proxy failed");
            }
        }
        Err(err) => write_error(&mut stream, &err).await,
    }
}

enum Outcome {
    Handled(String),
    Proxy(crate::routes::Target),
}

/// Classify the request and resolve it to either an admin response body
/// or a route whose backend the caller must ensure is running before
/// proxying. Only touches the socket via peeking (spec.md §4.6), so it
/// never consumes bytes the Stream Proxy still needs.
async fn route_connection(state: &SharedState, stream: &TcpStream) -> Result<Outcome, GateError> {
    let Classified { method, path } =
        classify::classify(stream, state.config.api_key.as_deref()).await?;

    if let Some(response) = admin::dispatch(state, &path).await {
        return Ok(Outcome::Handled(response.body));
    }

    let route: Route = state
        .routes
        .lookup(&method, &path)
        .await
        .ok_or(GateError::NotFound)?;

    state
        .registry
        .touch(&route.target.group, &route.target, Instant::now());

    Ok(Outcome::Proxy(route.target))
}

/// Start the backend if it isn't already running and wait for it to
/// become healthy (spec.md §4.7 steps 5–6). A no-op when the container
/// is already up.
async fn ensure_running(state: &SharedState, target: &crate::routes::Target) -> Result<(), GateError> {
    let container_name = container_name_for(&target.group);

    if state.runtime.is_running(&container_name).await {
        return Ok(());
    }

    if target.image.is_empty() {
        return Err(GateError::MissingImage);
    }

    tracing::info!(
        group = target.group,
        container = container_name,
        image = target.image,
        "starting backend container"
    );
    state
        .runtime
        .start(&container_name, &target.image, target.port, &target.volumes)
        .await;

    let healthy =
        health::wait_healthy(target.port, &target.health, state.config.startup_timeout).await;
    if !healthy {
        return Err(GateError::Unhealthy);
    }
    Ok(())
}

async fn write_ok_json(stream: &mut TcpStream, body: &str) {
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn write_error(stream: &mut TcpStream, err: &GateError) {
    let body = err.body();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        err.status_line(),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

// ABOUTME: Image pulls through Podman's native libpod endpoint over its unix socket.
// ABOUTME: Lets Podman apply its own registry configuration and pull policy.

use crate::runtime::bollard::image_with_tag;
use crate::runtime::traits::EnvironmentError;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;

fn pull_error(image: &str, detail: impl std::fmt::Display) -> EnvironmentError {
    EnvironmentError::Runtime(format!("failed to pull {}: {}", image, detail))
}

pub(crate) fn pull_uri(image: &str, force: bool) -> String {
    let policy = if force { "always" } else { "missing" };
    format!(
        "/v4.0.0/libpod/images/pull?reference={}&policy={}",
        urlencoding::encode(image),
        policy
    )
}

/// First error reported in a libpod pull progress stream.
pub(crate) fn stream_error(body: &str) -> Option<String> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .find_map(|value| match value.get("error") {
            Some(serde_json::Value::String(e)) if !e.is_empty() => Some(e.clone()),
            _ => None,
        })
}

/// Pull `image` via `POST /libpod/images/pull`.
pub(crate) async fn pull(socket_path: &str, image: &str, force: bool) -> Result<(), EnvironmentError> {
    let image = image_with_tag(image);
    tracing::debug!(image = %image, force, "pulling image via libpod");

    let stream = UnixStream::connect(socket_path)
        .await
        .map_err(|e| pull_error(&image, format!("failed to connect to socket: {}", e)))?;

    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| pull_error(&image, format!("HTTP handshake failed: {}", e)))?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::warn!("libpod connection error: {}", e);
        }
    });

    let req = hyper::Request::builder()
        .method("POST")
        .uri(pull_uri(&image, force))
        .header("Host", "localhost")
        .body(Empty::<Bytes>::new())
        .map_err(|e| pull_error(&image, format!("failed to build request: {}", e)))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| pull_error(&image, format!("request failed: {}", e)))?;

    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(|e| pull_error(&image, format!("failed to read response: {}", e)))?
        .to_bytes();
    let text = String::from_utf8_lossy(&body);

    if !status.is_success() {
        return Err(pull_error(&image, format!("libpod API error: {}", text.trim())));
    }
    if let Some(e) = stream_error(&text) {
        return Err(pull_error(&image, e));
    }
    Ok(())
}

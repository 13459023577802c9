//! Request handling and transformation.
//!
//! # Responsibilities
//! - Read the request ID assigned by the request-id layer
//! - Build the backend URI from the processed path
//! - Prepare headers and protocol version for forwarding to the backend
//!
//! # Design Decisions
//! - The query string is carried over untouched; only the path is rewritten
//! - The client's Host is replaced by the backend's and kept as X-Forwarded-Host
//! - Backends are always spoken to over HTTP/1.1, whatever the client used

use axum::http::uri::{Authority, Scheme};
use axum::http::{header, request, HeaderMap, HeaderName, HeaderValue, Uri, Version};

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Request ID of the current request, or "unknown".
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Build the URI a request is forwarded to.
pub fn backend_uri(original: &Uri, path: &str, server: &Authority) -> Result<Uri, axum::http::Error> {
    let path_and_query = match original.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(server.clone())
        .path_and_query(path_and_query)
        .build()
}

/// Prepare request parts whose URI already targets `server`.
///
/// The client's Host is swapped for the backend's (the original is kept as
/// X-Forwarded-Host) and the version is pinned to HTTP/1.1, since the
/// backend client rejects HTTP/2 requests on HTTP/1 connections.
pub fn prepare_forward(parts: &mut request::Parts, server: &Authority) {
    parts.version = Version::HTTP_11;
    if let Some(host) = parts.headers.remove(header::HOST) {
        parts.headers.insert(X_FORWARDED_HOST, host);
    }
    if let Ok(host) = HeaderValue::from_str(server.as_str()) {
        parts.headers.insert(header::HOST, host);
    }
}

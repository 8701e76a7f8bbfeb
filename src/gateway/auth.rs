//! Authorization gate middleware
//!
//! Widget routes are guarded by a single API key carried in a
//! Basic-scheme `Authorization` header: the user portion of the decoded
//! `user:password` pair is the credential token. With no key configured
//! the gate always permits. Rejections short-circuit with a fixed 403
//! response and never reach the wrapped handler.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, warn};

use crate::config::AuthConfig;

/// Fixed body of the rejection response
pub const REJECTION_BODY: &str = "API key incorrect";

/// Resolved gate configuration (key expanded)
#[derive(Debug)]
pub struct ResolvedGate {
    /// Resolved API key; `None` disables the gate
    pub api_key: Option<String>,
    /// Paths that bypass the gate
    pub public_paths: Vec<String>,
}

impl ResolvedGate {
    /// Create a resolved gate from [`AuthConfig`]
    pub fn from_config(config: &AuthConfig) -> Self {
        let api_key = config.resolve_api_key();

        // Log if auto-generated key
        if config.api_key.as_deref() == Some("auto") {
            if let Some(ref key) = api_key {
                tracing::info!("Auto-generated API key: {}", key);
            }
        }

        Self {
            api_key,
            public_paths: config.public_paths.clone(),
        }
    }

    /// Check if a path is public (bypasses the gate)
    #[must_use]
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| path.starts_with(p))
    }

    /// Check whether an `Authorization` header value carries the
    /// configured key.
    ///
    /// Always true when no key is configured. The comparison is plain
    /// string equality on the decoded token.
    #[must_use]
    pub fn permits(&self, authorization: Option<&str>) -> bool {
        let Some(ref api_key) = self.api_key else {
            return true;
        };
        authorization
            .and_then(basic_credential)
            .is_some_and(|token| token == *api_key)
    }
}

/// Extract the credential token from a Basic-scheme header value.
///
/// Returns `None` for any malformed header: wrong token count, a scheme
/// other than `basic`, undecodable base64, or a non-UTF-8 payload.
fn basic_credential(header: &str) -> Option<String> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let encoded = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    // The user portion before the first colon is the credential token.
    let token = decoded.split(':').next().unwrap_or_default();
    Some(token.to_string())
}

/// Authorization gate middleware
pub async fn gate_middleware(
    State(gate): State<Arc<ResolvedGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if gate.api_key.is_none() {
        return next.run(request).await;
    }

    if gate.is_public_path(path) {
        debug!(path = %path, "Public path, skipping gate");
        return next.run(request).await;
    }

    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if gate.permits(authorization) {
        next.run(request).await
    } else {
        warn!(path = %path, "Rejected request with missing or incorrect API key");
        forbidden_response()
    }
}

/// Create the fixed 403 Forbidden response
fn forbidden_response() -> Response {
    (StatusCode::FORBIDDEN, REJECTION_BODY).into_response()
}

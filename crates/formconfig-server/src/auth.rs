//! Bearer-token gate for the write routes.
//!
//! When [`AppState::admin_token`] is set, every request routed through
//! [`require_admin_token`] must carry `Authorization: Bearer <token>`.
//! Without a configured token the gate is open.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use formconfig_core::FormConfigError;
use http::header::AUTHORIZATION;
use http::HeaderMap;

use crate::api::{ApiError, AppState};

/// Rejects requests that do not present the configured admin token.
pub async fn require_admin_token(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_token.as_deref() else {
        return next.run(req).await;
    };

    let presented = bearer_token(req.headers());
    if presented.is_some_and(|token| token_matches(token, expected)) {
        next.run(req).await
    } else {
        tracing::info!(path = %req.uri().path(), "rejected write without valid admin token");
        ApiError(FormConfigError::Unauthorized(
            "a valid bearer token is required".into(),
        ))
        .into_response()
    }
}

/// Compares two tokens without short-circuiting on the first differing byte.
fn token_matches(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

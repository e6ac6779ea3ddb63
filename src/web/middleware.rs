use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::responses::WebError;
use super::AppState;

/// Gate for the scheduled trigger: `Authorization: Bearer <cron_secret>`.
///
/// Runs before the handler, so a rejected call does no refresh work. With no
/// secret configured every scheduled call is rejected.
pub async fn require_cron_secret(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = state.config.security.cron_secret.as_deref();

    if cron_authorized(request.headers(), expected) {
        next.run(request).await
    } else {
        tracing::warn!(uri = %request.uri(), "Rejected scheduled refresh without a valid secret");
        WebError::Unauthorized.into_response()
    }
}

pub fn cron_authorized(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let expected = match expected {
        Some(secret) if !secret.is_empty() => secret,
        _ => return false,
    };

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| constant_time_eq(token.trim().as_bytes(), expected.as_bytes()))
        .unwrap_or(false)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

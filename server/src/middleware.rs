//! Access control for license management routes.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use licensor_license::ApiResponse;
use tracing::debug;

use crate::session::SESSION_COOKIE;
use crate::AppState;

/// Rejects requests without a live admin session.
///
/// The token is read from the session cookie, or from an
/// `Authorization: Bearer` header. On success the [`Session`] is stored as a
/// request extension.
///
/// [`Session`]: crate::session::Session
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = match session_token(req.headers()) {
        Some(token) => state.sessions.get(token).await,
        None => None,
    };

    match session {
        Some(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => {
            debug!(path = %req.uri().path(), "rejected unauthenticated admin request");
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::fail("unauthorized")),
            )
                .into_response()
        }
    }
}

/// Extracts the session token from the cookie or bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

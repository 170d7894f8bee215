//! Admin account endpoints: register, login, logout, session check.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use licensor_license::ApiResponse;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::AuthError;
use crate::middleware::session_token;
use crate::reply::{blocking, json_body, send};
use crate::session::SESSION_COOKIE;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckData {
    pub logged_in: bool,
}

fn auth_failure(err: AuthError) -> Response {
    match &err {
        AuthError::Store(_) | AuthError::Hash(_) => {
            error!("admin auth failure: {err}");
            send(ApiResponse::<()>::fail("internal server error"))
        }
        _ => send(ApiResponse::<()>::fail(err.to_string())),
    }
}

/// POST /api/admin/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let creds = match json_body(payload) {
        Ok(creds) => creds,
        Err(resp) => return resp,
    };

    let auth = state.auth.clone();
    match blocking(move || auth.register(&creds.username, &creds.password)).await {
        Ok(Ok(_)) => send(ApiResponse::<()>::ok("admin created")),
        Ok(Err(e)) => auth_failure(e),
        Err(resp) => resp,
    }
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let creds = match json_body(payload) {
        Ok(creds) => creds,
        Err(resp) => return resp,
    };

    let auth = state.auth.clone();
    let admin = match blocking(move || auth.authenticate(&creds.username, &creds.password)).await {
        Ok(Ok(admin)) => admin,
        Ok(Err(e)) => return auth_failure(e),
        Err(resp) => return resp,
    };

    let token = state.sessions.create(&admin).await;
    info!(username = %admin.username, "admin logged in");

    let cookie = session_cookie(&token, state.sessions.ttl().as_secs());
    let body = Json(ApiResponse::ok_with("logged in", LoginData { token }));
    match HeaderValue::from_str(&cookie) {
        Ok(value) => ([(header::SET_COOKIE, value)], body).into_response(),
        Err(_) => body.into_response(),
    }
}

/// POST /api/admin/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if state.sessions.destroy(token).await {
            info!("admin logged out");
        }
    }

    (
        [(header::SET_COOKIE, HeaderValue::from_static(CLEAR_COOKIE))],
        Json(ApiResponse::<()>::ok("logged out")),
    )
        .into_response()
}

/// GET /api/admin/check
pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let logged_in = match session_token(&headers) {
        Some(token) => state.sessions.get(token).await.is_some(),
        None => false,
    };

    let message = if logged_in { "logged in" } else { "not logged in" };
    send(ApiResponse {
        success: logged_in,
        message: message.to_string(),
        data: Some(CheckData { logged_in }),
    })
}

const CLEAR_COOKIE: &str = "licensor_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_format() {
        assert_eq!(
            session_cookie("abc", 60),
            "licensor_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );
    }

    #[test]
    fn clear_cookie_targets_session_cookie() {
        assert!(CLEAR_COOKIE.starts_with(&format!("{SESSION_COOKIE}=;")));
    }
}

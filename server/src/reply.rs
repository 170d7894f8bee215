//! Shared response plumbing for handlers.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use licensor_license::{ApiResponse, ErrorKind, LicenseError};
use serde::Serialize;
use tracing::{debug, error};

/// Serializes an envelope with HTTP 200.
pub fn send<T: Serialize>(resp: ApiResponse<T>) -> Response {
    Json(resp).into_response()
}

/// Converts an engine error into a failure envelope.
pub fn license_failure(err: LicenseError) -> Response {
    match err.kind() {
        ErrorKind::StoreFailure => error!("store failure: {err}"),
        kind => debug!(?kind, "request rejected: {err}"),
    }
    send(ApiResponse::<()>::from(&err))
}

/// Unwraps a JSON body or answers 400 with a failure envelope.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        debug!("malformed request body: {rejection}");
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::fail(rejection.body_text())),
        )
            .into_response()
    })
}

/// Runs synchronous store work off the async executor.
pub async fn blocking<T, F>(work: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        error!("blocking task failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::fail("internal server error")),
        )
            .into_response()
    })
}

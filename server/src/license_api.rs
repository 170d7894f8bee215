//! License endpoints: client verification and admin management.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use licensor_license::ApiResponse;
use serde::Deserialize;

use crate::reply::{blocking, json_body, license_failure, send};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyRequest {
    pub key: String,
    pub server_id: String,
    pub hwid: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddRequest {
    pub key: String,
    pub server_id: String,
    pub owner: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckRequest {
    pub key: String,
    pub server_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ManageRequest {
    pub key: String,
    pub action: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteRequest {
    pub key: String,
}

/// POST /api/verify
pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    let engine = state.verification.clone();
    match blocking(move || engine.verify(&req.key, &req.server_id, &req.hwid)).await {
        Ok(Ok(outcome)) => send(ApiResponse::ok_with(outcome.message(), outcome)),
        Ok(Err(e)) => license_failure(e),
        Err(resp) => resp,
    }
}

/// POST /api/add
pub async fn add(
    State(state): State<AppState>,
    payload: Result<Json<AddRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    let engine = state.management.clone();
    match blocking(move || engine.add(&req.key, &req.server_id, &req.owner)).await {
        Ok(Ok(record)) => send(ApiResponse::ok_with("license added", record)),
        Ok(Err(e)) => license_failure(e),
        Err(resp) => resp,
    }
}

/// POST /api/check
pub async fn check(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    let engine = state.management.clone();
    match blocking(move || engine.lookup(&req.key, &req.server_id)).await {
        Ok(Ok(record)) => send(ApiResponse::ok_with("license found", record)),
        Ok(Err(e)) => license_failure(e),
        Err(resp) => resp,
    }
}

/// POST /api/manage
pub async fn manage(
    State(state): State<AppState>,
    payload: Result<Json<ManageRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    let engine = state.management.clone();
    match blocking(move || engine.set_state(&req.key, &req.action)).await {
        Ok(Ok(change)) => send(ApiResponse::ok_with("license updated", change)),
        Ok(Err(e)) => license_failure(e),
        Err(resp) => resp,
    }
}

/// GET /api/list
pub async fn list(State(state): State<AppState>) -> Response {
    let engine = state.management.clone();
    match blocking(move || engine.list()).await {
        Ok(Ok(records)) => {
            let message = format!("{} licenses", records.len());
            send(ApiResponse::ok_with(message, records))
        }
        Ok(Err(e)) => license_failure(e),
        Err(resp) => resp,
    }
}

/// POST /api/delete
pub async fn delete(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };

    let engine = state.management.clone();
    match blocking(move || engine.delete(&req.key)).await {
        Ok(Ok(())) => send(ApiResponse::<()>::ok("license deleted")),
        Ok(Err(e)) => license_failure(e),
        Err(resp) => resp,
    }
}

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use licensor_server::auth::KdfParams;
use licensor_server::{build_router, AppState, RouterOptions};
use licensor_store::MemoryStore;
use serde_json::{json, Value};

pub const ADMIN_USER: &str = "root";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Cheap Argon2 settings so tests stay fast.
pub fn fast_kdf() -> KdfParams {
    KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
pub async fn spawn_server(options: RouterOptions) -> String {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Duration::from_secs(3600),
        fast_kdf(),
    );
    let app = build_router(state, &options);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

/// Server with management routes left open.
pub async fn spawn_open_server() -> String {
    spawn_server(RouterOptions {
        require_auth: false,
        ..RouterOptions::default()
    })
    .await
}

/// Client that keeps cookies between requests.
pub fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().unwrap()
}

pub async fn post(client: &reqwest::Client, base: &str, path: &str, body: Value) -> (u16, Value) {
    let resp = client
        .post(format!("{}{}", base, path))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

pub async fn get(client: &reqwest::Client, base: &str, path: &str) -> (u16, Value) {
    let resp = client.get(format!("{}{}", base, path)).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

/// Registers the first admin and logs the client in.
pub async fn login_admin(client: &reqwest::Client, base: &str) -> String {
    let creds = json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD});
    let (_, body) = post(client, base, "/api/admin/register", creds.clone()).await;
    assert_eq!(body["success"], true, "register failed: {body}");

    let (_, body) = post(client, base, "/api/admin/login", creds).await;
    assert_eq!(body["success"], true, "login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

pub async fn verify(client: &reqwest::Client, base: &str, key: &str, hwid: &str) -> Value {
    let (status, body) = post(
        client,
        base,
        "/api/verify",
        json!({"key": key, "serverId": "S1", "hwid": hwid}),
    )
    .await;
    assert_eq!(status, 200);
    body
}

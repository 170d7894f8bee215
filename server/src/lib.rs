//! HTTP API for the licensor license server.
//!
//! `/api/verify` is open to licensed clients. License management routes
//! sit behind [`middleware::require_admin`] unless
//! [`RouterOptions::require_auth`] is turned off.

pub mod admin_api;
pub mod auth;
pub mod config;
pub mod license_api;
pub mod middleware;
pub mod reply;
pub mod session;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, Method};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use licensor_license::{ManagementEngine, VerificationEngine};
use licensor_store::{AdminStore, LicenseStore};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;

use crate::auth::{AdminAuth, KdfParams};
use crate::session::SessionStore;

/// Shared state threaded through axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub verification: VerificationEngine,
    pub management: ManagementEngine,
    pub auth: Arc<AdminAuth>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Wires both engines and the admin layer to one store.
    pub fn new<S>(store: Arc<S>, session_ttl: Duration, kdf: KdfParams) -> Self
    where
        S: LicenseStore + AdminStore + 'static,
    {
        let licenses: Arc<dyn LicenseStore> = store.clone();
        let admins: Arc<dyn AdminStore> = store;
        Self {
            verification: VerificationEngine::new(Arc::clone(&licenses)),
            management: ManagementEngine::new(licenses),
            auth: Arc::new(AdminAuth::new(admins, kdf)),
            sessions: Arc::new(SessionStore::new(session_ttl)),
        }
    }
}

/// Route-level switches.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub require_auth: bool,
    pub allow_register: bool,
    pub static_dir: Option<PathBuf>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            require_auth: true,
            allow_register: true,
            static_dir: None,
        }
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Build the HTTP API router.
pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let mut management = Router::new()
        .route("/api/add", post(license_api::add))
        .route("/api/check", post(license_api::check))
        .route("/api/manage", post(license_api::manage))
        .route("/api/list", get(license_api::list))
        .route("/api/delete", post(license_api::delete));
    if options.require_auth {
        management = management.route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ));
    }

    let mut admin = Router::new()
        .route("/api/admin/login", post(admin_api::login))
        .route("/api/admin/logout", post(admin_api::logout))
        .route("/api/admin/check", get(admin_api::check));
    if options.allow_register {
        admin = admin.route("/api/admin/register", post(admin_api::register));
    }

    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/verify", post(license_api::verify))
        .merge(management)
        .merge(admin);
    if let Some(dir) = &options.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    // Credentialed CORS for the browser admin panel.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    app.layer(cors).with_state(state)
}

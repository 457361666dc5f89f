use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::services::{AccountService, PcbTypeService};
use crate::state::SharedState;

mod assets;
pub mod auth;
mod error;
pub mod flash;
pub mod htmx;
mod observability;
mod pcb_types;
pub mod permissions;
mod system;
pub mod templates;

pub use error::{ApiError, login_redirect_location};

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn pcb_types(&self) -> &Arc<dyn PcbTypeService> {
        &self.shared.pcb_type_service
    }

    #[must_use]
    pub fn accounts(&self) -> &Arc<dyn AccountService> {
        &self.shared.account_service
    }

    #[must_use]
    pub fn login_url(&self) -> &str {
        &self.shared.config.server.login_url
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    Router::new()
        .route("/", get(auth::home))
        .route(
            "/accounts/login/",
            get(auth::login_form).post(auth::login),
        )
        .route("/accounts/logout/", axum::routing::post(auth::logout))
        .route(
            "/accounts/register/",
            get(auth::register_form).post(auth::register),
        )
        .route("/list/", get(pcb_types::list))
        .route(
            "/create/",
            get(pcb_types::create_form).post(pcb_types::create),
        )
        .route(
            "/update/{id}/",
            get(pcb_types::update_form).post(pcb_types::update),
        )
        .route(
            "/delete/{id}/",
            get(pcb_types::delete_form).post(pcb_types::delete),
        )
        .route("/view/{id}/", get(pcb_types::detail))
        .route("/metrics", get(observability::get_metrics))
        .route("/health", get(system::health))
        .route("/static/{*path}", get(assets::serve_asset))
        .fallback(system::not_found)
        .layer(session_layer)
        .with_state(state)
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        // Inside TraceLayer so handlers record `user_id` on this request span.
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

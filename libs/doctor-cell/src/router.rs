use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/apply", post(handlers::apply_as_doctor))
        .route("/", get(handlers::list_doctors))
        .route("/approved", get(handlers::list_approved_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor).put(handlers::update_doctor_profile))
        .route("/{doctor_id}/status", patch(handlers::update_doctor_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn notification_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/seen", put(handlers::mark_all_seen).get(handlers::get_seen_notifications))
        .route("/unseen", get(handlers::get_unseen_notifications))
        .route("/", delete(handlers::clear_all))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::NotificationError;
use crate::services::inbox::InboxService;

fn map_error(e: NotificationError) -> AppError {
    match e {
        NotificationError::UserNotFound => AppError::NotFound("User not found".to_string()),
        NotificationError::AdminNotConfigured => AppError::Internal(e.to_string()),
        NotificationError::DatabaseError(msg) => AppError::Internal(msg),
    }
}

#[axum::debug_handler]
pub async fn mark_all_seen(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let inbox_service = InboxService::new(&state);

    let updated = inbox_service.mark_all_seen(&user.id, token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "message": "All notifications have been seen",
        "seen_notifications": updated.seen_notifications,
        "unseen_notifications": updated.unseen_notifications,
    })))
}

#[axum::debug_handler]
pub async fn clear_all(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let inbox_service = InboxService::new(&state);

    inbox_service.clear_all(&user.id, token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "message": "All notifications have been removed",
    })))
}

#[axum::debug_handler]
pub async fn get_unseen_notifications(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let inbox_service = InboxService::new(&state);

    let unseen = inbox_service.unseen_notifications(&user.id, token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "unseen_notifications": unseen,
    })))
}

#[axum::debug_handler]
pub async fn get_seen_notifications(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let inbox_service = InboxService::new(&state);

    let seen = inbox_service.seen_notifications(&user.id, token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "seen_notifications": seen,
    })))
}

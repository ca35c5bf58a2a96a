use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    ApplyDoctorRequest, DoctorError, UpdateDoctorProfileRequest, UpdateDoctorStatusRequest,
};
use crate::services::{ApprovalService, DoctorService};

fn map_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::UserNotFound => AppError::NotFound("User not found".to_string()),
        DoctorError::AlreadyDoctor | DoctorError::AlreadyApplied => AppError::Conflict(e.to_string()),
        DoctorError::StatusRequired | DoctorError::InvalidStatusTransition(_) => {
            AppError::ValidationError(e.to_string())
        }
        DoctorError::NotificationError(msg) | DoctorError::DatabaseError(msg) => {
            AppError::Internal(msg)
        }
    }
}

#[axum::debug_handler]
pub async fn apply_as_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<ApplyDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let approval_service = ApprovalService::new(&state);

    approval_service.apply_as_doctor(&user.id, request, token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "message": "Apply request has been sent successfully. Please wait for admin approval."
    })))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    if !user.is_admin() {
        return Err(AppError::Forbidden("Only administrators can list all doctors".to_string()));
    }

    let doctor_service = DoctorService::new(&state);
    let doctors = doctor_service.list_doctors(token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn list_approved_doctors(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service.list_approved_doctors(token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.get_doctor(&doctor_id, token).await
        .map_err(map_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn update_doctor_profile(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateDoctorProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let doctor_service = DoctorService::new(&state);

    // Only the owning doctor or an admin may patch a profile.
    let doctor = doctor_service.get_doctor(&doctor_id, token).await
        .map_err(map_error)?;

    if !user.is_admin() && doctor.user_id.to_string() != user.id {
        return Err(AppError::Forbidden("Not authorized to update this doctor profile".to_string()));
    }

    let updated = doctor_service.update_doctor_profile(&doctor_id, request, token).await
        .map_err(map_error)?;

    Ok(Json(json!(updated)))
}

#[axum::debug_handler]
pub async fn update_doctor_status(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateDoctorStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    if !user.is_admin() {
        return Err(AppError::Forbidden("Only administrators can update doctor status".to_string()));
    }

    let approval_service = ApprovalService::new(&state);
    let doctor = approval_service.update_doctor_status(&doctor_id, request.status, token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "message": "Doctor state has been updated",
        "doctor": doctor
    })))
}

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use doctor_cell::services::DoctorService;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, BookAppointmentRequest, CheckAvailabilityRequest, SlotAvailability,
    UpdateAppointmentStatusRequest,
};
use crate::services::BookingService;

fn map_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::DoctorNotFound
        | AppointmentError::PatientNotFound
        | AppointmentError::DoctorProfileNotFound => AppError::NotFound(e.to_string()),
        AppointmentError::Unauthorized => AppError::Auth(e.to_string()),
        AppointmentError::OutsideWorkingHours
        | AppointmentError::StatusRequired
        | AppointmentError::InvalidTime(_)
        | AppointmentError::InvalidStatusTransition(_) => AppError::ValidationError(e.to_string()),
        AppointmentError::NotificationError(msg) | AppointmentError::DatabaseError(msg) => {
            AppError::Internal(msg)
        }
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = BookingService::new(&state);

    let appointment = booking_service.book_appointment(&user.id, request, token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "message": "Appointment has been booked successfully",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn check_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CheckAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = BookingService::new(&state);

    let availability = booking_service.check_availability(request, token).await
        .map_err(map_error)?;

    let body = match availability {
        SlotAvailability::Available => json!({
            "available": true,
            "message": "Appointment slot is available"
        }),
        SlotAvailability::Unavailable { reason } => json!({
            "available": false,
            "message": reason.to_string()
        }),
    };

    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = BookingService::new(&state);

    let appointments = booking_service.appointments_for_patient(&user.id, token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    // Admins may read any doctor's list; a doctor only their own.
    if !user.is_admin() {
        let doctor_service = DoctorService::new(&state);
        let doctor = doctor_service.get_doctor(&doctor_id, token).await
            .map_err(|_| AppError::NotFound("Doctor not found".to_string()))?;

        if doctor.user_id.to_string() != user.id {
            return Err(AppError::Forbidden(
                "Not authorized to view this doctor's appointments".to_string(),
            ));
        }
    }

    let booking_service = BookingService::new(&state);
    let appointments = booking_service.appointments_for_doctor(&doctor_id, token).await
        .map_err(map_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateAppointmentStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = BookingService::new(&state);

    let appointment = booking_service
        .update_appointment_status(&user.id, &appointment_id, request.status, token)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "message": "Appointment status has been updated",
        "appointment": appointment
    })))
}

use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::services::DoctorService;
use notification_cell::services::fanout::{FanoutService, NotificationCommand};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::account::UserRecord;
use shared_models::notification::{Notification, NotificationEvent};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    CheckAvailabilityRequest, SlotAvailability,
};
use crate::services::availability::AvailabilityService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::timeslot;

/// Command fanned out when a booking lands: the doctor's owning user gets
/// the request notification.
pub fn booking_fanout(
    appointment: &Appointment,
    patient_name: &str,
    doctor_user_id: Uuid,
) -> Vec<NotificationCommand> {
    vec![NotificationCommand::to_user(
        doctor_user_id,
        Notification::new(
            NotificationEvent::NewAppointment {
                appointment_id: appointment.id,
                patient_name: patient_name.to_string(),
            },
            format!("A new appointment request from {}", patient_name),
            Some("/doctor/appointments"),
        ),
    )]
}

/// Commands fanned out when the doctor decides: the patient is told, the
/// admin gets a mirrored copy.
pub fn status_fanout(
    appointment: &Appointment,
    status: AppointmentStatus,
) -> Vec<NotificationCommand> {
    let event = || match status {
        AppointmentStatus::Confirmed => NotificationEvent::NewAppointmentConfirmed {
            appointment_id: appointment.id,
        },
        _ => NotificationEvent::NewAppointmentCancelled {
            appointment_id: appointment.id,
        },
    };

    vec![
        NotificationCommand::to_user(
            appointment.user_id,
            Notification::new(
                event(),
                format!("Your appointment has been {}", status),
                Some("/appointments"),
            ),
        ),
        NotificationCommand::to_admin(Notification::new(
            event(),
            format!("An appointment has been {}", status),
            None,
        )),
    ]
}

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    availability_service: AvailabilityService,
    lifecycle_service: AppointmentLifecycleService,
    doctor_service: DoctorService,
    fanout_service: FanoutService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            availability_service: AvailabilityService::new(config),
            lifecycle_service: AppointmentLifecycleService::new(),
            doctor_service: DoctorService::new(config),
            fanout_service: FanoutService::new(config),
        }
    }

    /// Advisory pre-flight check; clients call this before booking. No lock
    /// is taken, so the answer can be stale by the time the booking lands.
    pub async fn check_availability(
        &self,
        request: CheckAvailabilityRequest,
        auth_token: &str,
    ) -> Result<SlotAvailability, AppointmentError> {
        let requested = timeslot::parse_clock(&request.time)?;
        let doctor = self.load_doctor(&request.doctor_id, auth_token).await?;

        self.availability_service
            .check_availability(&doctor, request.date, requested, auth_token)
            .await
    }

    /// Create a pending appointment for the calling patient and notify the
    /// doctor. The working-hours rule is re-applied here even though the
    /// client is expected to have run the advisory check first.
    pub async fn book_appointment(
        &self,
        patient_id: &str,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            patient_id, request.doctor_id
        );

        let requested = timeslot::parse_clock(&request.time)?;
        let doctor = self.load_doctor(&request.doctor_id, auth_token).await?;
        let patient = self.load_patient(patient_id, auth_token).await?;

        if !AvailabilityService::within_working_hours(&doctor, requested)? {
            warn!(
                "Booking refused: {} is outside doctor {} working hours",
                request.time, doctor.id
            );
            return Err(AppointmentError::OutsideWorkingHours);
        }

        let now = chrono::Utc::now();
        let appointment_data = json!({
            "user_id": patient.id,
            "doctor_id": doctor.id,
            "date": timeslot::normalize_date(request.date).to_rfc3339(),
            "time": timeslot::normalize_time(requested).to_rfc3339(),
            "status": AppointmentStatus::Pending.to_string(),
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Appointment> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some(auth_token),
            Some(appointment_data),
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointment = result.into_iter().next()
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to create appointment".to_string()))?;

        self.fanout_service
            .deliver(
                &booking_fanout(&appointment, &patient.name, doctor.user_id),
                auth_token,
            )
            .await
            .map_err(|e| AppointmentError::NotificationError(e.to_string()))?;

        info!("Appointment {} booked with doctor {}", appointment.id, doctor.id);
        Ok(appointment)
    }

    /// Doctor decision on a pending appointment. The appointment is loaded
    /// filtered by the requesting doctor's profile, then ownership is
    /// re-checked explicitly before the transition is validated and saved.
    pub async fn update_appointment_status(
        &self,
        requesting_user_id: &str,
        appointment_id: &str,
        new_status: Option<AppointmentStatus>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let new_status = new_status.ok_or(AppointmentError::StatusRequired)?;

        let doctor = self
            .doctor_service
            .get_doctor_by_user(requesting_user_id, auth_token)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
            .ok_or(AppointmentError::DoctorProfileNotFound)?;

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&doctor_id=eq.{}",
            appointment_id, doctor.id
        );
        let result: Vec<Appointment> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointment = result.into_iter().next().ok_or(AppointmentError::NotFound)?;

        // The lookup above already filters by doctor; this re-check guards
        // against the filter drifting out from under us.
        if appointment.doctor_id != doctor.id {
            warn!(
                "Ownership mismatch: doctor {} touching appointment {}",
                doctor.id, appointment.id
            );
            return Err(AppointmentError::Unauthorized);
        }

        self.lifecycle_service
            .validate_status_transition(&appointment.status, &new_status)?;

        let update = json!({
            "status": new_status.to_string(),
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });

        let update_path = format!("/rest/v1/appointments?id=eq.{}", appointment.id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Appointment> = self.supabase.request_with_headers(
            Method::PATCH,
            &update_path,
            Some(auth_token),
            Some(update),
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let updated = result.into_iter().next().ok_or(AppointmentError::NotFound)?;

        self.fanout_service
            .deliver(&status_fanout(&updated, new_status), auth_token)
            .await
            .map_err(|e| AppointmentError::NotificationError(e.to_string()))?;

        info!("Appointment {} is now {}", updated.id, new_status);
        Ok(updated)
    }

    pub async fn appointments_for_doctor(
        &self,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching appointments for doctor {}", doctor_id);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&order=date.asc,time.asc",
            doctor_id
        );
        let appointments: Vec<Appointment> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(appointments)
    }

    pub async fn appointments_for_patient(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching appointments for user {}", user_id);

        let path = format!(
            "/rest/v1/appointments?user_id=eq.{}&order=date.asc,time.asc",
            user_id
        );
        let appointments: Vec<Appointment> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(appointments)
    }

    async fn load_doctor(
        &self,
        doctor_id: &Uuid,
        auth_token: &str,
    ) -> Result<doctor_cell::models::Doctor, AppointmentError> {
        self.doctor_service
            .get_doctor(&doctor_id.to_string(), auth_token)
            .await
            .map_err(|e| match e {
                doctor_cell::models::DoctorError::NotFound => AppointmentError::DoctorNotFound,
                other => AppointmentError::DatabaseError(other.to_string()),
            })
    }

    async fn load_patient(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<UserRecord, AppointmentError> {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let result: Vec<UserRecord> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(AppointmentError::PatientNotFound)
    }
}

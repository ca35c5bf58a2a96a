use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use notification_cell::services::fanout::{FanoutService, NotificationCommand};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::account::{UserRecord, UserRole};
use shared_models::notification::{Notification, NotificationEvent};

use crate::models::{ApplyDoctorRequest, Doctor, DoctorError, DoctorStatus};
use crate::services::doctor::DoctorService;

/// Commands fanned out when a new application lands: the admin gets the
/// only copy.
pub fn application_fanout(doctor: &Doctor) -> Vec<NotificationCommand> {
    vec![NotificationCommand::to_admin(Notification::new(
        NotificationEvent::NewDoctorApplied {
            doctor_id: doctor.id,
            doctor_name: doctor.full_name(),
        },
        format!("Mr/Mrs {} has applied for a doctor", doctor.last_name),
        Some("/admin/doctors"),
    ))]
}

/// Commands fanned out when the admin decides: one to the applicant, a
/// mirrored one to the admin inbox.
pub fn decision_fanout(doctor: &Doctor, status: DoctorStatus) -> Vec<NotificationCommand> {
    let event = || match status {
        DoctorStatus::Approved => NotificationEvent::NewDoctorApproved {
            doctor_id: doctor.id,
            doctor_name: doctor.full_name(),
        },
        _ => NotificationEvent::NewDoctorRejected {
            doctor_id: doctor.id,
            doctor_name: doctor.full_name(),
        },
    };

    vec![
        NotificationCommand::to_user(
            doctor.user_id,
            Notification::new(
                event(),
                format!("Your apply request has been {}", status),
                None,
            ),
        ),
        NotificationCommand::to_admin(Notification::new(
            event(),
            format!("Mr/Mrs {} has been {}", doctor.last_name, status),
            Some("/admin/doctors"),
        )),
    ]
}

/// pending -> approved | rejected lifecycle of a doctor application,
/// including the role promotion on approval.
pub struct ApprovalService {
    supabase: Arc<SupabaseClient>,
    doctor_service: DoctorService,
    fanout_service: FanoutService,
}

impl ApprovalService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            doctor_service: DoctorService::new(config),
            fanout_service: FanoutService::new(config),
        }
    }

    /// Create a pending application for the calling user and notify the
    /// admin. One application per user; users who already carry the doctor
    /// role cannot re-apply.
    pub async fn apply_as_doctor(
        &self,
        user_id: &str,
        request: ApplyDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        info!("User {} applying as doctor", user_id);

        let user = self.load_user(user_id, auth_token).await?;

        if user.role == UserRole::Doctor {
            return Err(DoctorError::AlreadyDoctor);
        }

        if self.doctor_service.get_doctor_by_user(user_id, auth_token).await?.is_some() {
            warn!("User {} already has a doctor application", user_id);
            return Err(DoctorError::AlreadyApplied);
        }

        let now = chrono::Utc::now();
        let doctor_data = json!({
            "user_id": user_id,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "email": request.email,
            "phone_number": request.phone_number,
            "website": request.website,
            "address": request.address,
            "specialization": request.specialization,
            "experience": request.experience,
            "fee_per_consultation": request.fee_per_consultation,
            "timings": request.timings,
            "status": DoctorStatus::Pending.to_string(),
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Doctor> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/doctors",
            Some(auth_token),
            Some(doctor_data),
            Some(headers),
        ).await.map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let doctor = result.into_iter().next()
            .ok_or_else(|| DoctorError::DatabaseError("Failed to create doctor application".to_string()))?;

        self.fanout_service
            .deliver(&application_fanout(&doctor), auth_token)
            .await
            .map_err(|e| DoctorError::NotificationError(e.to_string()))?;

        info!("Doctor application {} created for user {}", doctor.id, user_id);
        Ok(doctor)
    }

    /// Admin decision on a pending application. Approval promotes the owning
    /// user's role; either outcome notifies the applicant and the admin.
    /// Writes are sequential saves, not a transaction.
    pub async fn update_doctor_status(
        &self,
        doctor_id: &str,
        new_status: Option<DoctorStatus>,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        let new_status = new_status.ok_or(DoctorError::StatusRequired)?;

        let doctor = self.doctor_service.get_doctor(doctor_id, auth_token).await?;

        // A decided application never transitions again.
        if doctor.status != DoctorStatus::Pending
            || !matches!(new_status, DoctorStatus::Approved | DoctorStatus::Rejected)
        {
            warn!(
                "Refusing doctor status transition {} -> {} for {}",
                doctor.status, new_status, doctor_id
            );
            return Err(DoctorError::InvalidStatusTransition(doctor.status));
        }

        // The owning user must resolve before any write happens.
        let user = self.load_user(&doctor.user_id.to_string(), auth_token).await?;

        let updated_doctor = self.patch_doctor_status(doctor_id, new_status, auth_token).await?;

        if new_status == DoctorStatus::Approved {
            self.promote_to_doctor(&user, auth_token).await?;
        }

        self.fanout_service
            .deliver(&decision_fanout(&updated_doctor, new_status), auth_token)
            .await
            .map_err(|e| DoctorError::NotificationError(e.to_string()))?;

        info!("Doctor {} has been {}", doctor_id, new_status);
        Ok(updated_doctor)
    }

    async fn load_user(&self, user_id: &str, auth_token: &str) -> Result<UserRecord, DoctorError> {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let result: Vec<UserRecord> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(DoctorError::UserNotFound)
    }

    async fn patch_doctor_status(
        &self,
        doctor_id: &str,
        status: DoctorStatus,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let update = json!({
            "status": status.to_string(),
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Doctor> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(update),
            Some(headers),
        ).await.map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }

    async fn promote_to_doctor(
        &self,
        user: &UserRecord,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        debug!("Promoting user {} to doctor role", user.id);

        let path = format!("/rest/v1/users?id=eq.{}", user.id);
        let update = json!({
            "role": UserRole::Doctor.to_string(),
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });

        let _: Vec<Value> = self.supabase.request(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(update),
        ).await.map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

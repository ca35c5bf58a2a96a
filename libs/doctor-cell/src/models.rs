use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Doctor profile as stored in the `doctors` collection. Created by a user
/// applying; `status` is only ever mutated by the approval workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    /// Owning user; one profile per user.
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub website: String,
    pub address: String,
    pub specialization: String,
    pub experience: String,
    pub fee_per_consultation: f64,
    /// Working hours as ["HH:mm", "HH:mm"] open/close pair. Assumed ordered
    /// at creation; not validated here.
    pub timings: [String; 2],
    pub status: DoctorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn open_time(&self) -> &str {
        &self.timings[0]
    }

    pub fn close_time(&self) -> &str {
        &self.timings[1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctorStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for DoctorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoctorStatus::Pending => write!(f, "pending"),
            DoctorStatus::Approved => write!(f, "approved"),
            DoctorStatus::Rejected => write!(f, "rejected"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyDoctorRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub website: String,
    pub address: String,
    pub specialization: String,
    pub experience: String,
    pub fee_per_consultation: f64,
    pub timings: [String; 2],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<String>,
    pub fee_per_consultation: Option<f64>,
    pub timings: Option<[String; 2]>,
}

/// Body of the admin status decision. `status` is optional so a missing
/// field surfaces as a validation error instead of a deserialization 422.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDoctorStatusRequest {
    pub status: Option<DoctorStatus>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("You are already a doctor")]
    AlreadyDoctor,

    #[error("You have already applied for a doctor")]
    AlreadyApplied,

    #[error("Status is required")]
    StatusRequired,

    #[error("Doctor application cannot leave status: {0}")]
    InvalidStatusTransition(DoctorStatus),

    #[error("Notification delivery failed: {0}")]
    NotificationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

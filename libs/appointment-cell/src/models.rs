use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// Stored appointment. `date` and `time` are independent axes, both kept as
/// normalized instants: `date` is midnight UTC of the calendar day, `time`
/// is the time of day anchored to 1970-01-01 so slots on different days
/// stay comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// The patient who booked.
    pub user_id: Uuid,
    pub doctor_id: Uuid,
    pub date: DateTime<Utc>,
    pub time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// Requested time of day, 24-hour "HH:mm".
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckAvailabilityRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
}

/// `status` is optional so a missing field surfaces as a validation error
/// instead of a deserialization 422.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: Option<AppointmentStatus>,
}

/// Advisory answer: holds no lock, so a slot reported available can still be
/// lost to a concurrent booking.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotAvailability {
    Available,
    Unavailable { reason: UnavailableReason },
}

impl SlotAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, SlotAvailability::Available)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    OutsideWorkingHours,
    SlotTaken,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::OutsideWorkingHours => write!(f, "outside working hours"),
            UnavailableReason::SlotTaken => {
                write!(f, "slot conflicts with existing confirmed appointment")
            }
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("No doctor profile for this user")]
    DoctorProfileNotFound,

    #[error("Requested time is outside working hours")]
    OutsideWorkingHours,

    #[error("Status is required")]
    StatusRequired,

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error("Notification delivery failed: {0}")]
    NotificationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

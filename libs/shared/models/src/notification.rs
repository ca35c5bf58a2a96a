use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Event carried by a notification. Tagged-union serialization reproduces
/// the stored `{"type": ..., "data": {...}}` shape while keeping each
/// payload strongly typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum NotificationEvent {
    NewDoctorApplied {
        doctor_id: Uuid,
        doctor_name: String,
    },
    NewDoctorApproved {
        doctor_id: Uuid,
        doctor_name: String,
    },
    NewDoctorRejected {
        doctor_id: Uuid,
        doctor_name: String,
    },
    NewAppointment {
        appointment_id: Uuid,
        patient_name: String,
    },
    NewAppointmentConfirmed {
        appointment_id: Uuid,
    },
    NewAppointmentCancelled {
        appointment_id: Uuid,
    },
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationEvent::NewDoctorApplied { .. } => write!(f, "new-doctor-applied"),
            NotificationEvent::NewDoctorApproved { .. } => write!(f, "new-doctor-approved"),
            NotificationEvent::NewDoctorRejected { .. } => write!(f, "new-doctor-rejected"),
            NotificationEvent::NewAppointment { .. } => write!(f, "new-appointment"),
            NotificationEvent::NewAppointmentConfirmed { .. } => write!(f, "new-appointment-confirmed"),
            NotificationEvent::NewAppointmentCancelled { .. } => write!(f, "new-appointment-cancelled"),
        }
    }
}

/// Inbox entry. Immutable once created; it moves wholesale from the unseen
/// list to the seen list or is cleared, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(flatten)]
    pub event: NotificationEvent,
    pub message: String,
    /// Client-side navigation hint, e.g. `/admin/doctors`.
    pub path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(event: NotificationEvent, message: impl Into<String>, path: Option<&str>) -> Self {
        Self {
            event,
            message: message.into(),
            path: path.map(String::from),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_serializes_to_tagged_wire_shape() {
        let doctor_id = Uuid::new_v4();
        let notification = Notification::new(
            NotificationEvent::NewDoctorApplied {
                doctor_id,
                doctor_name: "Jane Doe".to_string(),
            },
            "Mr/Mrs Doe has applied for a doctor",
            Some("/admin/doctors"),
        );

        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["type"], "new-doctor-applied");
        assert_eq!(value["data"]["doctor_id"], json!(doctor_id.to_string()));
        assert_eq!(value["data"]["doctor_name"], "Jane Doe");
        assert_eq!(value["path"], "/admin/doctors");
    }

    #[test]
    fn event_round_trips_through_stored_json() {
        let notification = Notification::new(
            NotificationEvent::NewAppointmentConfirmed {
                appointment_id: Uuid::new_v4(),
            },
            "Your appointment has been confirmed",
            None,
        );

        let value = serde_json::to_value(&notification).unwrap();
        let back: Notification = serde_json::from_value(value).unwrap();
        assert_eq!(back, notification);
        assert!(back.path.is_none());
    }
}

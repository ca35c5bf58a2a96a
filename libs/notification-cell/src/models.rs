use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum NotificationError {
    #[error("User not found")]
    UserNotFound,

    #[error("Admin recipient is not configured")]
    AdminNotConfigured,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::account::UserRecord;
use shared_models::notification::Notification;

use crate::models::NotificationError;

/// Who a fanout command is addressed to. The admin inbox is resolved at
/// delivery time from `AppConfig.admin_user_id` so workflows never query for
/// a user with the admin role.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipient {
    User(Uuid),
    Admin,
}

/// One pending inbox append. Workflows build these as plain data; nothing is
/// written until `FanoutService::deliver` runs.
#[derive(Debug, Clone)]
pub struct NotificationCommand {
    pub recipient: Recipient,
    pub notification: Notification,
}

impl NotificationCommand {
    pub fn to_user(user_id: Uuid, notification: Notification) -> Self {
        Self {
            recipient: Recipient::User(user_id),
            notification,
        }
    }

    pub fn to_admin(notification: Notification) -> Self {
        Self {
            recipient: Recipient::Admin,
            notification,
        }
    }
}

pub struct FanoutService {
    supabase: Arc<SupabaseClient>,
    admin_user_id: String,
}

impl FanoutService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            admin_user_id: config.admin_user_id.clone(),
        }
    }

    /// Apply each command as a read-modify-write append onto the recipient's
    /// unseen inbox. Writes are sequential with no transactional wrapper; a
    /// failure part-way leaves earlier appends in place and surfaces the
    /// error to the caller.
    pub async fn deliver(
        &self,
        commands: &[NotificationCommand],
        auth_token: &str,
    ) -> Result<(), NotificationError> {
        for command in commands {
            let user_id = self.resolve_recipient(&command.recipient)?;
            self.push_unseen(&user_id, &command.notification, auth_token).await?;
        }

        Ok(())
    }

    fn resolve_recipient(&self, recipient: &Recipient) -> Result<String, NotificationError> {
        match recipient {
            Recipient::User(id) => Ok(id.to_string()),
            Recipient::Admin => {
                if self.admin_user_id.is_empty() {
                    warn!("Dropping admin notification: no admin user configured");
                    return Err(NotificationError::AdminNotConfigured);
                }
                Ok(self.admin_user_id.clone())
            }
        }
    }

    async fn push_unseen(
        &self,
        user_id: &str,
        notification: &Notification,
        auth_token: &str,
    ) -> Result<(), NotificationError> {
        debug!("Delivering {} notification to user {}", notification.event, user_id);

        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let result: Vec<UserRecord> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        let mut user = result.into_iter().next()
            .ok_or(NotificationError::UserNotFound)?;

        user.unseen_notifications.push(notification.clone());

        let update = json!({
            "unseen_notifications": user.unseen_notifications,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });

        let _: Vec<Value> = self.supabase.request(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(update),
        ).await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

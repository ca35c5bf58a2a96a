use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::account::UserRecord;
use shared_models::notification::Notification;

use crate::models::NotificationError;

pub struct InboxService {
    supabase: Arc<SupabaseClient>,
}

impl InboxService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Move the whole unseen inbox into the seen inbox, replacing whatever
    /// was there, and empty the unseen inbox. When nothing is unseen the
    /// call is a no-op, which keeps repeated calls from wiping the seen
    /// list.
    pub async fn mark_all_seen(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<UserRecord, NotificationError> {
        let mut user = self.load_user(user_id, auth_token).await?;

        if user.unseen_notifications.is_empty() {
            debug!("No unseen notifications for user {}, nothing to move", user_id);
            return Ok(user);
        }

        user.seen_notifications = std::mem::take(&mut user.unseen_notifications);

        let update = json!({
            "seen_notifications": user.seen_notifications,
            "unseen_notifications": [],
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });
        self.patch_user(user_id, update, auth_token).await?;

        Ok(user)
    }

    /// Empty both inboxes unconditionally.
    pub async fn clear_all(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<(), NotificationError> {
        // Existence check keeps a dangling id a 404 rather than a silent no-op.
        self.load_user(user_id, auth_token).await?;

        let update = json!({
            "seen_notifications": [],
            "unseen_notifications": [],
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });
        self.patch_user(user_id, update, auth_token).await?;

        Ok(())
    }

    pub async fn unseen_notifications(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Notification>, NotificationError> {
        let user = self.load_user(user_id, auth_token).await?;
        Ok(user.unseen_notifications)
    }

    pub async fn seen_notifications(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Notification>, NotificationError> {
        let user = self.load_user(user_id, auth_token).await?;
        Ok(user.seen_notifications)
    }

    async fn load_user(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<UserRecord, NotificationError> {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let result: Vec<UserRecord> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(NotificationError::UserNotFound)
    }

    async fn patch_user(
        &self,
        user_id: &str,
        update: Value,
        auth_token: &str,
    ) -> Result<(), NotificationError> {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let _: Vec<Value> = self.supabase.request(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(update),
        ).await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

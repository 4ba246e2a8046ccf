use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::Entity;

pub type NotificationId = i64;

/// A recorded intent to notify a customer. Nothing is actually delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_id: Option<NotificationId>,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub sender: String,
    pub target_customer_id: i64,
    pub target_customer_email: String,
}

impl Entity for Notification {
    fn id(&self) -> Option<i64> {
        self.notification_id
    }

    fn assign_id(&mut self, id: i64) {
        self.notification_id = Some(id);
    }
}

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::errors::NotificationError;
use super::model::Notification;
use crate::clients::NotificationRequest;
use crate::metrics::NotificationMetrics;
use crate::storage::Repository;

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationServiceConfig {
    /// Label stamped on every notification
    pub sender: String,
}

impl Default for NotificationServiceConfig {
    fn default() -> Self {
        Self {
            sender: "IssamCode".to_string(),
        }
    }
}

pub struct NotificationService {
    notifications: Arc<dyn Repository<Notification>>,
    config: NotificationServiceConfig,
    metrics: Arc<NotificationMetrics>,
    clock: fn() -> DateTime<Utc>,
}

impl NotificationService {
    pub fn new(
        notifications: Arc<dyn Repository<Notification>>,
        config: NotificationServiceConfig,
        metrics: Arc<NotificationMetrics>,
    ) -> Self {
        Self {
            notifications,
            config,
            metrics,
            clock: Utc::now,
        }
    }

    /// Replace the source of "sent at" timestamps
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Record a notification for the target customer.
    ///
    /// Nothing is delivered; the target id, email and message are stored as
    /// given without validation.
    pub async fn send(&self, request: NotificationRequest) -> Result<(), NotificationError> {
        let notification = Notification {
            notification_id: None,
            message: request.message,
            sent_at: (self.clock)(),
            sender: self.config.sender.clone(),
            target_customer_id: request.to_customer_id,
            target_customer_email: request.to_customer_email,
        };

        let notification_id = self.notifications.insert(notification).await?;
        self.metrics.record_notification();

        tracing::info!(
            notification_id = notification_id,
            customer_id = request.to_customer_id,
            sender = %self.config.sender,
            "Notification recorded"
        );

        Ok(())
    }

    pub async fn list_notifications(&self) -> Result<Vec<Notification>, NotificationError> {
        Ok(self.notifications.list_all().await?)
    }
}

//! Best-effort notification dispatch.
//!
//! Each send is a single webhook POST. The outcome is reported as a `bool`;
//! failures are logged here and never propagated.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::NotificationConfig;
use crate::delivery::webhook::WebhookDelivery;
use crate::payload::{AlertNotification, ResultNotification};

/// Sends alert and verdict notifications. `true` means delivered.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_alert_notification(&self, payload: &AlertNotification) -> bool;

    async fn send_result_notification(&self, payload: &ResultNotification) -> bool;
}

/// [`Notifier`] backed by the two configured webhooks.
pub struct NotificationDispatcher {
    delivery: WebhookDelivery,
    alert_url: Option<String>,
    result_url: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            delivery: WebhookDelivery::new(),
            alert_url: config.alert_webhook_url.clone(),
            result_url: config.result_webhook_url.clone(),
        }
    }

    async fn send<T: Serialize + Sync>(&self, channel: &str, url: Option<&str>, payload: &T) -> bool {
        let Some(url) = url else {
            tracing::warn!(channel, "Webhook URL not configured, notification skipped");
            return false;
        };

        match self.delivery.deliver(url, payload).await {
            Ok(()) => {
                tracing::info!(channel, "Notification delivered");
                true
            }
            Err(e) => {
                tracing::error!(channel, url, error = %e, "Notification delivery failed");
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for NotificationDispatcher {
    async fn send_alert_notification(&self, payload: &AlertNotification) -> bool {
        self.send("alert", self.alert_url.as_deref(), payload).await
    }

    async fn send_result_notification(&self, payload: &ResultNotification) -> bool {
        self.send("result", self.result_url.as_deref(), payload).await
    }
}

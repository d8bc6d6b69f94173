//! Outbound notifications for the fire-alert pipeline.
//!
//! - [`delivery::webhook`]: single-shot JSON POST to a webhook URL.
//! - [`payload`]: the alert and verdict envelopes sent to the webhooks.
//! - [`dispatcher`]: the [`Notifier`] seam and its webhook-backed
//!   [`NotificationDispatcher`].

pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod payload;

pub use config::NotificationConfig;
pub use delivery::webhook::WebhookDelivery;
pub use dispatcher::{NotificationDispatcher, Notifier};
pub use payload::{AlertNotification, NotificationKind, ResultNotification, ResultStatus};

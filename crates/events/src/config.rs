#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub alert_webhook_url: Option<String>,
    pub result_webhook_url: Option<String>,
    /// Address placed in the `to` field of every payload.
    pub recipient: Option<String>,
}

impl NotificationConfig {
    /// Load configuration from environment variables. Empty values count as unset.
    ///
    /// | Env Var              | Default |
    /// |----------------------|---------|
    /// | `ALERT_WEBHOOK_URL`  | unset   |
    /// | `RESULT_WEBHOOK_URL` | unset   |
    /// | `ALERT_RECIPIENT`    | unset   |
    pub fn from_env() -> Self {
        Self {
            alert_webhook_url: non_empty_var("ALERT_WEBHOOK_URL"),
            result_webhook_url: non_empty_var("RESULT_WEBHOOK_URL"),
            recipient: non_empty_var("ALERT_RECIPIENT"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

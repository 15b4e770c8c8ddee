use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub notify: NotifySettings,
}

/// Address the registration HTTP server binds to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Operational parameters of the notification pipeline.
#[derive(Debug, Deserialize, Clone)]
pub struct NotifySettings {
    /// Topics available for webhook registration. Subscriptions against any
    /// other topic are rejected.
    pub topics: Vec<String>,
    /// Bound on every outbound HTTP call (verification and delivery), so a
    /// stalled callback cannot hold a worker indefinitely.
    pub request_timeout_secs: u64,
}

/// Partial configuration loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from
/// defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub notify: Option<PartialNotifySettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialNotifySettings {
    pub topics: Option<Vec<String>>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            notify: NotifySettings {
                topics: vec!["user.changed".to_string()],
                request_timeout_secs: 10,
            },
        }
    }
}

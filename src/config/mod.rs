mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{NotifySettings, ServerSettings, Settings};

/// Loads the configuration from the default file and environment variables,
/// merged over built-in defaults.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Deserialize what is available, then fill the gaps with defaults.
    let partial: PartialSettings = config.try_deserialize()?;

    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        notify: NotifySettings {
            topics: partial
                .notify
                .as_ref()
                .and_then(|n| n.topics.clone())
                .unwrap_or(default.notify.topics),
            request_timeout_secs: partial
                .notify
                .as_ref()
                .and_then(|n| n.request_timeout_secs)
                .unwrap_or(default.notify.request_timeout_secs),
        },
    })
}

use crate::application::ticker::{COUNTDOWN_INTERVAL, REFRESH_INTERVAL};
use serde::Deserialize;
use std::time::Duration;

const CONFIG_FILE: &str = "config/next_races";
const ENV_PREFIX: &str = "NEXT_RACES";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub ticker: TickerSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TickerSettings {
    pub refresh_interval_secs: u64,
    pub countdown_interval_secs: u64,
}

impl TickerSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_secs(self.countdown_interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

/// Defaults, then `config/next_races.*` if present, then `NEXT_RACES_*` env vars
/// (e.g. `NEXT_RACES_API__BASE_URL`).
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from(CONFIG_FILE)
}

fn load_app_config_from(file_name: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("api.base_url", "https://api.neds.com.au")?
        .set_default("api.timeout_secs", 10_i64)?
        .set_default("ticker.refresh_interval_secs", REFRESH_INTERVAL.as_secs() as i64)?
        .set_default("ticker.countdown_interval_secs", COUNTDOWN_INTERVAL.as_secs() as i64)?
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .add_source(config::File::with_name(file_name).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let config = load_app_config_from("config/does_not_exist").unwrap();

        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.ticker.refresh_interval(), Duration::from_secs(15));
        assert_eq!(config.ticker.countdown_interval(), Duration::from_secs(1));
        assert!(config.api.base_url.starts_with("https://"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let base = std::env::temp_dir().join(format!("next_races_test_{}", std::process::id()));
        std::fs::write(
            base.with_extension("toml"),
            "[api]\nbase_url = \"http://localhost:9000\"\n\n[ticker]\nrefresh_interval_secs = 30\n",
        )
        .unwrap();

        let config = load_app_config_from(base.to_str().unwrap()).unwrap();
        std::fs::remove_file(base.with_extension("toml")).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.ticker.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.ticker.countdown_interval(), Duration::from_secs(1));
    }
}

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub sessions: SessionSettings,
    #[serde(default)]
    pub adaptive: AdaptiveSettings,
    #[serde(default)]
    pub content: ContentSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Idle time after which a session is dropped. 0 keeps sessions until
    /// they are ended explicitly.
    pub idle_ttl_secs: u64,
    pub reap_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_ttl_secs: 0,
            reap_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AdaptiveSettings {
    /// Trailing misses after which the next adaptive question is one tier
    /// easier. Zero turns adaptation off.
    pub miss_streak_threshold: u32,
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        Self {
            miss_streak_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentSettings {
    /// JSON question bank replacing the built-in one.
    pub question_bank_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogSettings {
    #[serde(default)]
    pub format: LogFormat,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first (two levels up), then the local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
        let defaults = Config::default();

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .set_default("server.bind_addr", defaults.server.bind_addr)?
            .set_default("sessions.idle_ttl_secs", defaults.sessions.idle_ttl_secs)?
            .set_default(
                "sessions.reap_interval_secs",
                defaults.sessions.reap_interval_secs,
            )?
            .set_default(
                "adaptive.miss_streak_threshold",
                defaults.adaptive.miss_streak_threshold,
            )?
            .set_default("log.format", "pretty")?
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            // Override with environment variables (prefix: APP_, nested with __)
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;

        if config.content.question_bank_path.is_none() {
            config.content.question_bank_path = env::var("QUESTION_BANK_PATH").ok();
        }

        if config.sessions.idle_ttl_secs > 0 && config.sessions.reap_interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "sessions.reap_interval_secs must be positive when idle expiry is enabled"
                    .to_string(),
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "APP__SERVER__BIND_ADDR",
            "APP__SESSIONS__IDLE_TTL_SECS",
            "APP__SESSIONS__REAP_INTERVAL_SECS",
            "APP__ADAPTIVE__MISS_STREAK_THRESHOLD",
            "APP__LOG__FORMAT",
            "QUESTION_BANK_PATH",
        ] {
            env::remove_var(key);
        }
        env::set_var("SKIP_ROOT_ENV", "1");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8081");
        assert_eq!(config.sessions.idle_ttl_secs, 0);
        assert_eq!(config.adaptive.miss_streak_threshold, 2);
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert!(config.content.question_bank_path.is_none());
    }

    #[test]
    #[serial]
    fn test_load_without_overrides_uses_defaults() {
        clear_env();
        let config = Config::load().unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8081");
        assert_eq!(config.sessions.reap_interval_secs, 60);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("APP__SESSIONS__IDLE_TTL_SECS", "900");
        env::set_var("APP__ADAPTIVE__MISS_STREAK_THRESHOLD", "3");
        env::set_var("APP__LOG__FORMAT", "json");
        env::set_var("QUESTION_BANK_PATH", "/tmp/bank.json");

        let config = Config::load().unwrap();
        clear_env();

        assert_eq!(config.sessions.idle_ttl_secs, 900);
        assert_eq!(config.adaptive.miss_streak_threshold, 3);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(
            config.content.question_bank_path.as_deref(),
            Some("/tmp/bank.json")
        );
    }

    #[test]
    #[serial]
    fn test_zero_reap_interval_with_expiry_is_rejected() {
        clear_env();
        env::set_var("APP__SESSIONS__IDLE_TTL_SECS", "60");
        env::set_var("APP__SESSIONS__REAP_INTERVAL_SECS", "0");

        let result = Config::load();
        clear_env();

        assert!(result.is_err());
    }
}

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the LMS progress updater
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Login credentials
    pub credentials: CredentialsConfig,

    /// LMS server settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// LMS account name
    pub username: String,

    /// LMS account password
    pub password: String,

    /// User id to submit under when the login reply omits one
    pub fallback_user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the LMS
    pub base_url: String,

    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        // Try to load from various locations
        let config_paths = [
            "lms-progress.toml",
            "config/lms-progress.toml",
            "~/.config/lms-progress/config.toml",
            "/etc/lms-progress/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Override with environment variables
        if let Ok(username) = std::env::var("LMS_PROGRESS_USERNAME") {
            config.credentials.username = username;
        }

        if let Ok(password) = std::env::var("LMS_PROGRESS_PASSWORD") {
            config.credentials.password = password;
        }

        if let Ok(user_id) = std::env::var("LMS_PROGRESS_USER_ID") {
            config.credentials.fallback_user_id = user_id;
        }

        if let Ok(base_url) = std::env::var("LMS_PROGRESS_BASE_URL") {
            config.server.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("LMS_PROGRESS_TIMEOUT") {
            config.server.timeout_seconds = timeout.parse().unwrap_or(30);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.credentials.username.is_empty() {
            return Err(anyhow!(
                "username is not set (set LMS_PROGRESS_USERNAME or add it to lms-progress.toml)"
            ));
        }

        if self.credentials.password.is_empty() {
            return Err(anyhow!(
                "password is not set (set LMS_PROGRESS_PASSWORD or add it to lms-progress.toml)"
            ));
        }

        if let Err(e) = Url::parse(&self.server.base_url) {
            return Err(anyhow!(
                "base_url {} is not a valid URL: {}",
                self.server.base_url,
                e
            ));
        }

        if self.server.timeout_seconds == 0 {
            return Err(anyhow!("timeout_seconds must be greater than 0"));
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "LMS Progress Configuration:\n\
            - Server: {}\n\
            - Username: {}\n\
            - Fallback user id: {}\n\
            - Timeout: {}s",
            self.server.base_url,
            self.credentials.username,
            self.credentials.fallback_user_id,
            self.server.timeout_seconds
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: CredentialsConfig {
                username: String::new(),
                password: String::new(),
                fallback_user_id: String::new(),
            },
            server: ServerConfig {
                base_url: "https://lms.aerothai.co.th".to_string(),
                timeout_seconds: 30,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "https://lms.aerothai.co.th");
        assert_eq!(config.server.timeout_seconds, 30);
        assert!(config.credentials.username.is_empty());
    }

    #[test]
    fn test_parses_a_toml_file() {
        let raw = r#"
            [credentials]
            username = "somchai"
            password = "hunter2"
            fallback_user_id = "3759"

            [server]
            base_url = "https://lms.aerothai.co.th"
            timeout_seconds = 15
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.credentials.username, "somchai");
        assert_eq!(config.credentials.fallback_user_id, "3759");
        assert_eq!(config.server.timeout_seconds, 15);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("LMS_PROGRESS_USERNAME", "somchai");
        std::env::set_var("LMS_PROGRESS_PASSWORD", "hunter2");
        std::env::set_var("LMS_PROGRESS_USER_ID", "3759");
        std::env::set_var("LMS_PROGRESS_BASE_URL", "https://lms.test.local");
        std::env::set_var("LMS_PROGRESS_TIMEOUT", "5");

        let config = Config::from_env().unwrap();
        assert_eq!(config.credentials.username, "somchai");
        assert_eq!(config.credentials.password, "hunter2");
        assert_eq!(config.credentials.fallback_user_id, "3759");
        assert_eq!(config.server.base_url, "https://lms.test.local");
        assert_eq!(config.server.timeout_seconds, 5);

        // A timeout that fails to parse falls back to the default
        std::env::set_var("LMS_PROGRESS_TIMEOUT", "soon");
        let config = Config::from_env().unwrap();
        assert_eq!(config.server.timeout_seconds, 30);

        for name in [
            "LMS_PROGRESS_USERNAME",
            "LMS_PROGRESS_PASSWORD",
            "LMS_PROGRESS_USER_ID",
            "LMS_PROGRESS_BASE_URL",
            "LMS_PROGRESS_TIMEOUT",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_filled_in_config_validates() {
        let mut config = Config::default();
        config.credentials.username = "somchai".to_string();
        config.credentials.password = "hunter2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_missing_credentials() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let mut config = Config::default();
        config.credentials.username = "somchai".to_string();
        config.credentials.password = "hunter2".to_string();
        config.server.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}

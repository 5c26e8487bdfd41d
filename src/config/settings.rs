//! Application settings and configuration
//!
//! Loads all process-wide configuration from environment variables (and an
//! optional `.env` file) once at startup. The resulting `Settings` struct is
//! immutable and passed explicitly to the dispatcher and adapters; nothing
//! reads the environment after boot.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!(
                "Invalid environment: {}. Expected: development, staging, or production",
                s
            ),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,

    // Server settings
    pub host: String,
    pub port: u16,

    // Provider credentials
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub openrouter_api_key: Option<String>,

    // Provider endpoints and models
    pub gemini_base_url: Option<String>,
    pub openrouter_base_url: Option<String>,
    pub gemini_model: String,
    pub openrouter_model: String,

    /// Substituted for an empty or whitespace-only prompt. The substitution
    /// is intentional, observable behavior: the effective prompt is echoed
    /// back in every response.
    pub default_prompt: String,

    // Timeouts
    pub image_fetch_timeout_seconds: u64,
    pub generation_timeout_seconds: u64,

    /// When true, a missing GEMINI_API_KEY is fatal at startup instead of
    /// degrading to per-request adapter failures.
    pub require_gemini_key: bool,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignored in production typically)
        dotenvy::dotenv().ok();

        let settings = Self {
            app_name: env_or_default("APP_NAME", "prompt-relay"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env_or_default("LOG_LEVEL", "info"),

            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "4000")
                .parse()
                .context("Invalid PORT value")?,

            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            openrouter_api_key: env::var("OPENROUTER_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),

            gemini_base_url: env::var("GEMINI_BASE_URL").ok(),
            openrouter_base_url: env::var("OPENROUTER_BASE_URL").ok(),
            gemini_model: env_or_default("GEMINI_MODEL", "gemini-2.5-flash"),
            openrouter_model: env_or_default(
                "OPENROUTER_MODEL",
                "deepseek/deepseek-chat-v3.1:free",
            ),

            default_prompt: env_or_default("DEFAULT_PROMPT", "Can you solve this?"),

            image_fetch_timeout_seconds: env_or_default("IMAGE_FETCH_TIMEOUT_SECONDS", "30")
                .parse()
                .unwrap_or(30),
            generation_timeout_seconds: env_or_default("GENERATION_TIMEOUT_SECONDS", "60")
                .parse()
                .unwrap_or(60),

            require_gemini_key: env_or_default("REQUIRE_GEMINI_KEY", "false")
                .parse()
                .unwrap_or(false),
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }
        if self.image_fetch_timeout_seconds == 0 {
            anyhow::bail!("IMAGE_FETCH_TIMEOUT_SECONDS must be > 0");
        }
        if self.generation_timeout_seconds == 0 {
            anyhow::bail!("GENERATION_TIMEOUT_SECONDS must be > 0");
        }

        if self.require_gemini_key && self.gemini_api_key.is_none() {
            anyhow::bail!("GEMINI_API_KEY is required (REQUIRE_GEMINI_KEY=true) but not set");
        }

        if self.gemini_api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set; the Gemini adapter will report failures");
        }
        if self.openrouter_api_key.is_none() {
            tracing::warn!("OPENROUTER_API_KEY not set; the Deepseek adapter will report failures");
        }

        Ok(())
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "prompt-relay".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 4000,
            gemini_api_key: None,
            openrouter_api_key: None,
            gemini_base_url: None,
            openrouter_base_url: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            openrouter_model: "deepseek/deepseek-chat-v3.1:free".to_string(),
            default_prompt: "Can you solve this?".to_string(),
            image_fetch_timeout_seconds: 30,
            generation_timeout_seconds: 60,
            require_gemini_key: false,
        }
    }
}

/// Helper function to get environment variable with default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.app_name, "prompt-relay");
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.default_prompt, "Can you solve this?");
        assert_eq!(settings.image_fetch_timeout_seconds, 30);
        assert_eq!(settings.generation_timeout_seconds, 60);
        assert!(!settings.require_gemini_key);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("nonsense".parse::<Environment>().is_err());
    }

    #[test]
    fn test_server_addr() {
        let settings = Settings::default();
        assert_eq!(settings.server_addr(), "0.0.0.0:4000");
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let settings = Settings {
            port: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_mandatory_gemini_key() {
        let settings = Settings {
            require_gemini_key: true,
            gemini_api_key: None,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            require_gemini_key: true,
            gemini_api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    // Environment variables are process-global, so everything load() reads
    // is exercised in one test instead of several racing ones.
    #[test]
    fn test_load_env_overrides_and_empty_credential_filter() {
        let vars = [
            ("PORT", "5005"),
            ("GEMINI_API_KEY", ""),
            ("OPENROUTER_API_KEY", "sk-or-test"),
            ("IMAGE_FETCH_TIMEOUT_SECONDS", "not-a-number"),
            ("DEFAULT_PROMPT", "Describe the screenshot."),
        ];
        for (key, value) in vars {
            env::set_var(key, value);
        }

        let settings = Settings::load().unwrap();
        assert_eq!(settings.port, 5005);
        // An empty credential counts as unset.
        assert!(settings.gemini_api_key.is_none());
        assert_eq!(settings.openrouter_api_key.as_deref(), Some("sk-or-test"));
        // Malformed timeout values fall back to the default.
        assert_eq!(settings.image_fetch_timeout_seconds, 30);
        assert_eq!(settings.default_prompt, "Describe the screenshot.");
        // Untouched values keep their defaults.
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.generation_timeout_seconds, 60);

        for (key, _) in vars {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_credentials_not_serialized() {
        let settings = Settings {
            gemini_api_key: Some("secret".to_string()),
            openrouter_api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));
    }
}

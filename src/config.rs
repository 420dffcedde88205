use anyhow::Result;
use std::time::Duration;

/// Default endpoint of the free MyMemory translation API.
pub const DEFAULT_TRANSLATION_API_URL: &str = "https://api.mymemory.translated.net/get";

#[derive(Debug, Clone)]
pub struct Config {
    /// Translation engine endpoint; overridden by tests and self-hosted deployments
    pub translation_api_url: String,

    /// Per-request HTTP timeout in seconds
    pub http_timeout_secs: u64,

    /// Seconds of input inactivity before a typing indicator expires
    pub typing_expiry_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file (ignored in production)
        let _ = dotenvy::dotenv();

        Ok(Self {
            translation_api_url: std::env::var("TANDEM_TRANSLATION_API_URL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATION_API_URL.to_string()),

            http_timeout_secs: std::env::var("TANDEM_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),

            typing_expiry_secs: std::env::var("TANDEM_TYPING_EXPIRY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        })
    }

    /// Per-request HTTP timeout as a `Duration`.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Typing inactivity window as a `Duration`.
    pub fn typing_expiry(&self) -> Duration {
        Duration::from_secs(self.typing_expiry_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translation_api_url: DEFAULT_TRANSLATION_API_URL.to_string(),
            http_timeout_secs: 10,
            typing_expiry_secs: 3,
        }
    }
}

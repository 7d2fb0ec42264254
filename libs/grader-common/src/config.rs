// Remote execution service configuration
use std::time::Duration;

pub const DEFAULT_JUDGE0_URL: &str = "https://judge0-ce.p.rapidapi.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Connection settings for the Judge0 service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub host: Option<String>,
    pub base64_encoded: bool,
    pub timeout_seconds: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_JUDGE0_URL.to_string(),
            api_key: None,
            host: None,
            base64_encoded: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl JudgeConfig {
    /// Read JUDGE0_URL, JUDGE0_API_KEY, JUDGE0_HOST, JUDGE0_BASE64 and JUDGE0_TIMEOUT_SECS
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = non_empty("JUDGE0_URL")
            .unwrap_or_else(|| DEFAULT_JUDGE0_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let base64_encoded = match non_empty("JUDGE0_BASE64") {
            None => false,
            Some(v) => match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "JUDGE0_BASE64",
                        value: v,
                    })
                }
            },
        };

        let timeout_seconds = match non_empty("JUDGE0_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECONDS,
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "JUDGE0_TIMEOUT_SECS",
                value: v.clone(),
            })?,
        };

        Ok(Self {
            base_url,
            api_key: non_empty("JUDGE0_API_KEY"),
            host: non_empty("JUDGE0_HOST"),
            base64_encoded,
            timeout_seconds,
        })
    }

    /// Calls go through the RapidAPI gateway, which rejects unauthenticated requests
    pub fn requires_api_key(&self) -> bool {
        self.host.is_some() || self.base_url.contains("rapidapi.com")
    }

    /// Value for the X-RapidAPI-Host header
    pub fn rapidapi_host(&self) -> String {
        self.host.clone().unwrap_or_else(|| {
            self.base_url
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .split('/')
                .next()
                .unwrap_or_default()
                .to_string()
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::constants::{
    DEFAULT_BASE_URL, ENV_BASE_URL, ENV_IDENTITY_POLICY, MAX_ATTEMPTS, MAX_RETRY_BACKOFF_MS,
    REQUEST_TIMEOUT, RETRY_BACKOFF,
};
use crate::identity::IdentityPolicy;
use crate::transport::TransportConfig;
use crate::{ForumError, ForumResult};

/// Client configuration, persisted as `{data_dir}/config.json`.
/// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub identity_policy: IdentityPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: REQUEST_TIMEOUT.as_secs(),
            max_attempts: MAX_ATTEMPTS,
            retry_backoff_ms: RETRY_BACKOFF.as_millis() as u64,
            identity_policy: IdentityPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Effective config: `{data_dir}/config.json`, then environment
    /// overrides, then validation.
    pub fn load() -> Self {
        let mut config = Self::load_from(&crate::storage::path_utils::config_path());
        config.apply_overrides(
            std::env::var(ENV_BASE_URL).ok(),
            std::env::var(ENV_IDENTITY_POLICY).ok(),
        );
        config.validate();
        config
    }

    /// Read a config file. Missing or invalid files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Invalid client config, using defaults"
                );
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> ForumResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply `FORUM_BASE_URL` / `FORUM_IDENTITY_POLICY` style overrides.
    /// Blank values are ignored; an unknown policy name is ignored with a warning.
    pub fn apply_overrides(&mut self, base_url: Option<String>, policy: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(name) = policy.filter(|p| !p.trim().is_empty()) {
            match IdentityPolicy::parse(&name) {
                Some(p) => self.identity_policy = p,
                None => tracing::warn!(value = %name, "Unknown identity policy override, ignored"),
            }
        }
    }

    /// Clamp out-of-range values.
    pub fn validate(&mut self) {
        if self.max_attempts == 0 {
            tracing::warn!(field = "max_attempts", "Must be >= 1, resetting to 1");
            self.max_attempts = 1;
        }
        if self.timeout_secs == 0 {
            tracing::warn!(field = "timeout_secs", "Must be >= 1, resetting to 1");
            self.timeout_secs = 1;
        }
        if self.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
            tracing::warn!(
                field = "retry_backoff_ms",
                value = self.retry_backoff_ms,
                "Config out of range, clamping"
            );
            self.retry_backoff_ms = MAX_RETRY_BACKOFF_MS;
        }
    }

    /// Parsed base URL. Only http and https are accepted.
    pub fn base_url(&self) -> ForumResult<Url> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|e| ForumError::Config(format!("Invalid base_url '{}': {}", self.base_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ForumError::Config(format!(
                "Unsupported base_url scheme '{}' (expected http or https)",
                other
            ))),
        }
    }

    pub fn transport_config(&self) -> ForumResult<TransportConfig> {
        let mut config = TransportConfig::new(self.base_url()?);
        config.timeout = Duration::from_secs(self.timeout_secs);
        config.max_attempts = self.max_attempts;
        config.retry_backoff = Duration::from_millis(self.retry_backoff_ms);
        Ok(config)
    }

    /// Value of one top-level key, as JSON.
    pub fn get(&self, key: &str) -> ForumResult<Value> {
        let value = serde_json::to_value(self)?;
        value
            .get(key)
            .cloned()
            .ok_or_else(|| ForumError::Config(format!("Unknown key: {}", key)))
    }

    /// Set one top-level key. `raw` is parsed as JSON, falling back to a
    /// plain string. The result must still deserialize and is re-validated.
    pub fn set(&mut self, key: &str, raw: &str) -> ForumResult<Value> {
        let mut value = serde_json::to_value(&*self)?;
        let Some(map) = value.as_object_mut() else {
            return Err(ForumError::Config("Config is not an object".into()));
        };
        if !map.contains_key(key) {
            return Err(ForumError::Config(format!("Unknown key: {}", key)));
        }
        let parsed: Value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        map.insert(key.to_string(), parsed.clone());

        let mut updated: Self = serde_json::from_value(value)
            .map_err(|e| ForumError::Config(format!("Invalid value for {}: {}", key, e)))?;
        updated.validate();
        updated.base_url()?;
        *self = updated;
        Ok(parsed)
    }
}

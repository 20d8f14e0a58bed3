// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::constants::*;

/// Top-level configuration, deserialised from `tutor.toml`.
///
/// Every section and field has a default, so an empty file (or no file at
/// all) yields a working local setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerSettings,
    /// Where subject/unit content and logs live
    pub content: ContentSettings,
    /// Chat completions provider settings
    pub openai: OpenAiSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
    /// Attach the gateway failure class and message as `details` in 500
    /// responses. Off by default: the cause is logged server-side only.
    pub expose_error_details: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_HTTP_ADDR.to_string(),
            expose_error_details: false,
        }
    }
}

/// Content store and audit log locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// JSON document with `{"subjects": [...]}`
    pub path: PathBuf,
    /// Directory for `openai_prompts.log`
    pub log_dir: PathBuf,
    /// Disable the prompt audit log entirely
    pub audit_log_enabled: bool,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONTENT_PATH),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            audit_log_enabled: true,
        }
    }
}

/// Chat completions provider settings.
///
/// The credential itself is not stored here; it is read from the
/// environment variable named by `api_key_env` on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub model: String,
    pub max_completion_tokens: u32,
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            max_completion_tokens: DEFAULT_MAX_COMPLETION_TOKENS,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!(
                "Invalid server.bind_address '{}': expected host:port",
                self.server.bind_address
            );
        }
        if self.openai.model.trim().is_empty() {
            anyhow::bail!("openai.model must not be empty");
        }
        if self.openai.max_completion_tokens == 0 {
            anyhow::bail!("openai.max_completion_tokens must be greater than zero");
        }
        if self.openai.timeout_secs == 0 {
            anyhow::bail!("openai.timeout_secs must be greater than zero");
        }
        if self.openai.api_key_env.trim().is_empty() {
            anyhow::bail!("openai.api_key_env must name an environment variable");
        }
        Ok(())
    }
}

/// Where the provider credential comes from.
///
/// `Environment` re-reads the variable on every call so a key added or
/// removed while the server runs takes effect on the next request.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    Environment(String),
    Static(Option<String>),
}

impl CredentialSource {
    /// Current credential, or `None` when unset or blank.
    pub fn current(&self) -> Option<String> {
        let value = match self {
            CredentialSource::Environment(var) => std::env::var(var).ok(),
            CredentialSource::Static(value) => value.clone(),
        };
        value.filter(|key| !key.trim().is_empty())
    }

    /// Human-readable name of the setting, used in the fallback notice.
    pub fn label(&self) -> &str {
        match self {
            CredentialSource::Environment(var) => var,
            CredentialSource::Static(_) => DEFAULT_API_KEY_ENV,
        }
    }
}

impl From<&OpenAiSettings> for CredentialSource {
    fn from(settings: &OpenAiSettings) -> Self {
        CredentialSource::Environment(settings.api_key_env.clone())
    }
}

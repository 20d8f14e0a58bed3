// Project-wide constants
//
// Centralised here so addresses, paths and provider defaults have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Default bind address for the HTTP server (localhost only).
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// Default location of the subject/unit content document.
pub const DEFAULT_CONTENT_PATH: &str = "data/contents.json";

/// Default directory for the prompt audit log.
pub const DEFAULT_LOG_DIR: &str = "data/logs";

/// File name of the prompt audit log inside the log directory.
pub const PROMPT_LOG_FILE: &str = "openai_prompts.log";

/// Chat completions provider base URL (path is appended by the gateway).
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Model requested from the provider.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5-nano";

/// Token ceiling sent as `max_completion_tokens`.
pub const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 512;

/// Outbound request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the provider credential.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Maximum accepted request body for the HTTP API.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

// Append-only audit log of provider prompts and answers (JSONL)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::chat::ChatMessage;
use crate::config::constants::PROMPT_LOG_FILE;

/// Request half of an audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedRequest {
    pub model: String,
    pub max_completion_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

/// Response half of an audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedResponse {
    pub answer: String,
    /// Provider completion id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Provider token usage, passed through verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
}

/// Attempts to take the file lock before the entry is skipped.
const LOCK_ATTEMPTS: u32 = 50;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(10);

/// One line of the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptLogEntry {
    pub timestamp: DateTime<Utc>,
    pub request_id: Uuid,
    pub request: LoggedRequest,
    pub response: LoggedResponse,
}

impl PromptLogEntry {
    pub fn new(request: LoggedRequest, response: LoggedResponse) -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: Uuid::new_v4(),
            request,
            response,
        }
    }
}

/// Best-effort prompt audit log.
///
/// Every append opens the file, takes an exclusive advisory lock for the
/// one line and releases it, so concurrent requests never interleave
/// partial lines. The lock wait is bounded: if another holder keeps it
/// past the retry budget the append fails instead of blocking. The
/// directory is created on first write.
#[derive(Debug, Clone)]
pub struct PromptLog {
    dir: PathBuf,
}

impl PromptLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the log file
    pub fn path(&self) -> PathBuf {
        self.dir.join(PROMPT_LOG_FILE)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append an entry, reporting failures.
    pub fn append(&self, entry: &PromptLogEntry) -> Result<()> {
        // create_dir_all treats an existing directory as success, so racing
        // first writers are fine.
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create log directory {}", self.dir.display()))?;

        let mut line = serde_json::to_string(entry).context("Failed to serialize log entry")?;
        line.push('\n');

        let path = self.path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        lock_with_retry(&file).context("Failed to lock log file")?;
        let written = file
            .write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .context("Failed to write log entry");
        let _ = FileExt::unlock(&file);
        written
    }

    /// Append an entry, swallowing any failure.
    ///
    /// Used on the request path: an audit problem must never turn a good
    /// answer into an error.
    pub fn record(&self, entry: &PromptLogEntry) {
        if let Err(e) = self.append(entry) {
            tracing::warn!("Skipping prompt audit entry: {:#}", e);
        }
    }
}

fn lock_with_retry(file: &std::fs::File) -> std::io::Result<()> {
    let mut attempt = 1;
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(()),
            Err(e) if attempt >= LOCK_ATTEMPTS => return Err(e),
            Err(_) => {
                attempt += 1;
                std::thread::sleep(LOCK_RETRY_DELAY);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(answer: &str) -> PromptLogEntry {
        PromptLogEntry::new(
            LoggedRequest {
                model: "gpt-5-nano".into(),
                max_completion_tokens: 512,
                messages: vec![ChatMessage::system("brief"), ChatMessage::user("質問/です")],
            },
            LoggedResponse {
                answer: answer.into(),
                id: Some("chatcmpl-1".into()),
                usage: Some(serde_json::json!({"total_tokens": 12})),
            },
        )
    }

    #[test]
    fn test_append_creates_directory_and_writes_jsonl() {
        let temp = TempDir::new().unwrap();
        let log = PromptLog::new(temp.path().join("nested").join("logs"));

        log.append(&entry("first")).unwrap();
        log.append(&entry("second")).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: PromptLogEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.response.answer, "first");
        assert_eq!(parsed.request.model, "gpt-5-nano");
        assert_eq!(parsed.request.messages.len(), 2);
        assert_eq!(parsed.response.id.as_deref(), Some("chatcmpl-1"));
        // Non-ASCII and slashes are written literally
        assert!(lines[0].contains("質問/です"));
    }

    #[test]
    fn test_optional_response_fields_omitted() {
        let temp = TempDir::new().unwrap();
        let log = PromptLog::new(temp.path());
        let mut e = entry("bare");
        e.response.id = None;
        e.response.usage = None;

        log.append(&e).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert!(!contents.contains("\"usage\""));
        assert!(!contents.contains("\"id\""));
    }

    #[test]
    fn test_record_swallows_failures() {
        let temp = TempDir::new().unwrap();
        // A regular file where the directory should be
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let log = PromptLog::new(blocker.join("logs"));
        assert!(log.append(&entry("lost")).is_err());
        log.record(&entry("lost")); // must not panic
    }

    #[test]
    fn test_held_lock_skips_entry_instead_of_blocking() {
        let temp = TempDir::new().unwrap();
        let log = PromptLog::new(temp.path());

        let holder = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log.path())
            .unwrap();
        holder.lock_exclusive().unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        let writer = log.clone();
        std::thread::spawn(move || {
            let appended = writer.append(&entry("blocked")).is_ok();
            writer.record(&entry("blocked"));
            let _ = tx.send(appended);
        });

        let appended = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("append must give up while the lock is held");
        assert!(!appended);
        fs2::FileExt::unlock(&holder).unwrap();
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "");
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let temp = TempDir::new().unwrap();
        let log = PromptLog::new(temp.path());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        log.append(&entry(&format!("answer-{i}-{j}-{}", "x".repeat(512))))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 80);
        for line in lines {
            serde_json::from_str::<PromptLogEntry>(line).expect("every line is a whole entry");
        }
    }
}

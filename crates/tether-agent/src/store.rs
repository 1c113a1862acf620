//! Per-session conversation log.
//!
//! Each session gets a directory holding one JSONL file, one message per
//! line, appended after every completed turn. All calls are blocking file
//! I/O; async callers run them on the blocking pool.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{AgentError, Result};
use crate::types::Message;

/// File name of the per-session message log.
const MESSAGES_FILE: &str = "messages.jsonl";

/// Append-only JSONL conversation log for one session.
///
/// Layout: `{session_dir}/{session_id}/messages.jsonl`
#[derive(Debug, Clone)]
pub struct SessionStore {
    session_id: String,
    dir: PathBuf,
}

impl SessionStore {
    /// Open the store for `session_id`, creating its directory if needed.
    pub fn open(session_dir: &Path, session_id: &str) -> Result<Self> {
        let store = Self::locate(session_dir, session_id)?;
        fs::create_dir_all(&store.dir)?;
        Ok(store)
    }

    /// Read the history of a session without creating anything on disk.
    ///
    /// A session that was never written has an empty history.
    pub fn read_history(session_dir: &Path, session_id: &str) -> Result<Vec<Message>> {
        Self::locate(session_dir, session_id)?.load()
    }

    fn locate(session_dir: &Path, session_id: &str) -> Result<Self> {
        validate_session_id(session_id)?;
        Ok(Self {
            session_id: session_id.to_string(),
            dir: session_dir.join(session_id),
        })
    }

    /// Session this store belongs to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Path to the session's JSONL file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(MESSAGES_FILE)
    }

    /// Read every stored message, oldest first.
    pub fn load(&self) -> Result<Vec<Message>> {
        let path = self.path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&path)?);
        let mut messages = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            messages.push(serde_json::from_str(&line)?);
        }

        Ok(messages)
    }

    /// Append messages to the log.
    pub fn append(&self, messages: &[Message]) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())?;

        let mut buf = String::new();
        for message in messages {
            buf.push_str(&serde_json::to_string(message)?);
            buf.push('\n');
        }
        file.write_all(buf.as_bytes())?;
        file.sync_all()?;

        Ok(())
    }
}

/// Check that a session id is usable as a single directory name.
pub fn validate_session_id(session_id: &str) -> Result<()> {
    let invalid = session_id.is_empty()
        || session_id == "."
        || session_id == ".."
        || session_id.contains(['/', '\\', '\0']);

    if invalid {
        return Err(AgentError::InvalidSessionId(session_id.to_string()));
    }
    Ok(())
}

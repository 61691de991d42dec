//! Persistence of the active session between process runs, plus a
//! JSON-lines log of finished sessions.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::data_dir;
use crate::error::Result;
use crate::session::{RoutineSession, SessionSummary};

const ACTIVE_FILE: &str = "session.json";
const HISTORY_FILE: &str = "history.jsonl";

pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Store rooted in the application data directory.
    pub fn open() -> Result<Self> {
        Ok(Self { dir: data_dir()? })
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_FILE)
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    pub fn load_active(&self) -> Result<Option<RoutineSession>> {
        let path = self.active_path();
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)?;
        let session: RoutineSession = serde_json::from_str(&json)?;
        Ok(Some(session))
    }

    pub fn save_active(&self, session: &RoutineSession) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(self.active_path(), json)?;
        debug!(session_id = %session.id(), "active session saved");
        Ok(())
    }

    pub fn clear_active(&self) -> Result<()> {
        let path = self.active_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Append a finished session's summary to the history log.
    pub fn append_history(&self, summary: &SessionSummary) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.history_path())?;
        writeln!(file, "{}", serde_json::to_string(summary)?)?;
        Ok(())
    }

    /// Finished sessions, oldest first. Unreadable lines are skipped.
    pub fn history(&self) -> Result<Vec<SessionSummary>> {
        let path = self.history_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect())
    }
}

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const SESSION_DIR: &str = "sensei_terminal";
const SESSION_FILE: &str = "session.json";
const SESSION_VERSION: u32 = 1;

/// Identity handed out by the login endpoint. The token is stored alongside
/// the coach id but never attached to subsequent requests; its lifecycle is
/// the backend's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "coachId")]
    pub coach_id: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    #[serde(flatten)]
    session: Session,
}

/// Read the persisted session, if any. Unreadable, unparsable, or
/// version-mismatched files count as no session.
pub fn load() -> Option<Session> {
    let path = session_path()?;
    let raw = fs::read_to_string(&path).ok()?;
    let file = serde_json::from_str::<SessionFile>(&raw).ok()?;
    if file.version != SESSION_VERSION {
        return None;
    }
    Some(file.session)
}

pub fn save(session: &Session) -> Result<()> {
    let path = session_path().context("no cache directory available")?;
    let dir = path.parent().context("session path has no parent")?;
    fs::create_dir_all(dir).context("create session dir")?;

    let file = SessionFile {
        version: SESSION_VERSION,
        session: session.clone(),
    };
    let json = serde_json::to_string(&file).context("serialize session")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write session file")?;
    fs::rename(&tmp, &path).context("swap session file")?;
    Ok(())
}

pub fn clear() {
    if let Some(path) = session_path() {
        let _ = fs::remove_file(path);
    }
}

fn session_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(SESSION_DIR).join(SESSION_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(SESSION_DIR)
            .join(SESSION_FILE),
    )
}

//! Local session and settings store.
//!
//! The logged-in identity and the API base URL live as TOML files under the
//! user's config directory. Login and signup write the session file and
//! every protected command reads it back until logout clears it. An absent
//! session never defaults to any level of access.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::ApiClient;
use crate::model::Session;

const SESSION_FILE: &str = "session.toml";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    pub api_url: String,
}

pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Open the store in the platform config directory, creating it on
    /// first use. `CONSTY_CONFIG_DIR` overrides the location.
    pub fn open() -> Result<Self> {
        let dir = match std::env::var_os("CONSTY_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from("com", "consty", "consty")
                .context("could not resolve a config directory for this platform")?
                .config_dir()
                .to_path_buf(),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
        Ok(SessionStore::at(&dir))
    }

    /// Open the store rooted at an explicit directory.
    pub fn at(dir: &Path) -> Self {
        SessionStore {
            dir: dir.to_path_buf(),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn load_session(&self) -> Option<Session> {
        let content = fs::read_to_string(self.session_path()).ok()?;
        toml::from_str(&content).ok()
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        let content = toml::to_string_pretty(session).context("failed to encode session")?;
        fs::write(self.session_path(), content)
            .with_context(|| format!("failed to write {}", self.session_path().display()))?;
        debug!(username = %session.username, "session saved");
        Ok(())
    }

    pub fn clear_session(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
            debug!("session cleared");
        }
        Ok(())
    }

    pub fn load_settings(&self) -> Option<AppSettings> {
        let content = fs::read_to_string(self.settings_path()).ok()?;
        toml::from_str(&content).ok()
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let content = toml::to_string_pretty(settings).context("failed to encode settings")?;
        fs::write(self.settings_path(), content)
            .with_context(|| format!("failed to write {}", self.settings_path().display()))?;
        Ok(())
    }
}

/// Everything a screen needs, passed explicitly instead of read from
/// ambient global state.
pub struct AppContext {
    pub settings: AppSettings,
    pub store: SessionStore,
    pub api: ApiClient,
}

impl AppContext {
    pub fn session(&self) -> Option<Session> {
        self.store.load_session()
    }

    pub fn require_session(&self) -> Result<Session> {
        self.store
            .load_session()
            .context("You are not signed in. Run `consty login` first.")
    }

    /// Gate for mutating screens. Only an explicit admin role passes;
    /// unknown or missing roles stay read-only.
    pub fn require_admin(&self) -> Result<Session> {
        let session = self.require_session()?;
        if !session.role().can_manage() {
            bail!(
                "This action requires an administrator account (you are signed in as {}).",
                session.role().label()
            );
        }
        Ok(session)
    }
}

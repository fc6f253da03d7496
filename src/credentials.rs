use crate::{Credentials, Result, SongStatsError};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Storage for the two Last.fm settings (API key and username).
///
/// `set` only writes fields that are present and not blank, so a half-filled
/// settings form never erases a value that was stored earlier.
pub trait CredentialStore {
    /// Read the stored credentials. Either field may be absent.
    fn get(&self) -> Credentials;

    /// Store the non-blank fields of `credentials`, keeping the others.
    fn set(&self, credentials: &Credentials) -> Result<()>;
}

/// Combine stored credentials with an update, ignoring blank fields.
fn merge(stored: Credentials, update: &Credentials) -> Credentials {
    let pick = |new: Option<&String>, old: Option<String>| match new.map(|v| v.trim()) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => old,
    };

    Credentials {
        api_key: pick(update.api_key.as_ref(), stored.api_key),
        username: pick(update.username.as_ref(), stored.username),
    }
}

/// Credential store backed by a JSON file in the XDG config directory.
///
/// The default location is `~/.config/song-stats/credentials.json`; a missing
/// file reads as empty credentials.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store credentials at `~/.config/song-stats/credentials.json`.
    ///
    /// Returns an error if the XDG config directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            SongStatsError::Config("Cannot determine XDG config directory".to_string())
        })?;

        Ok(Self::new(
            config_dir.join("song-stats").join("credentials.json"),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Credentials> {
        if !self.path.exists() {
            return Ok(Credentials::default());
        }

        let json = fs::read_to_string(&self.path)?;
        serde_json::from_str(&json).map_err(|e| {
            SongStatsError::Parse(format!(
                "Failed to parse credentials file {}: {e}",
                self.path.display()
            ))
        })
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Credentials {
        match self.load() {
            Ok(credentials) => credentials,
            Err(e) => {
                log::warn!("Ignoring unreadable credentials: {e}");
                Credentials::default()
            }
        }
    }

    fn set(&self, credentials: &Credentials) -> Result<()> {
        let merged = merge(self.get(), credentials);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SongStatsError::Config(format!("Failed to create config directory: {e}"))
            })?;
        }

        let json = serde_json::to_string_pretty(&merged)
            .map_err(|e| SongStatsError::Parse(format!("Failed to serialize credentials: {e}")))?;
        fs::write(&self.path, json)?;

        log::debug!("Credentials saved to: {}", self.path.display());
        Ok(())
    }
}

/// In-process credential store, for hosts that keep settings themselves.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RefCell<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: RefCell::new(credentials),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Credentials {
        self.credentials.borrow().clone()
    }

    fn set(&self, credentials: &Credentials) -> Result<()> {
        let merged = merge(self.get(), credentials);
        *self.credentials.borrow_mut() = merged;
        Ok(())
    }
}

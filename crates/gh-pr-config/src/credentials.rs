//! OAuth credential persistence
//!
//! The application only needs "does a token exist", "load it" and "save
//! it". `FileCredentialStore` keeps the credentials as pretty JSON in the
//! config directory; `MemoryCredentialStore` backs tests and demo mode.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::paths;

/// Credentials obtained through the device flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub scope: String,
    pub last_updated: DateTime<Utc>,
}

impl Credentials {
    pub fn new(token: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            scope: scope.into(),
            last_updated: Utc::now(),
        }
    }

    /// A non-empty token means the user is authenticated
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Secret storage keyed by the fixed application identifier
pub trait CredentialStore: Send + Sync {
    /// Whether usable credentials have been stored
    fn exists(&self) -> bool;

    /// Load the stored credentials
    fn load(&self) -> Result<Credentials>;

    /// Persist credentials, stamping `last_updated`
    fn save(&self, credentials: &Credentials) -> Result<()>;
}

/// JSON file backed credential store
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location in the platform config directory
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(paths::credentials_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_private(&self, content: &str) -> Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&self.path)
            .with_context(|| format!("Failed to open credentials file: {:?}", self.path))?;
        // The open mode only applies to newly created files
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict credentials file: {:?}", self.path))?;
        }
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write credentials file: {:?}", self.path))?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn exists(&self) -> bool {
        // An unreadable or empty-token file means setup has to run again
        self.load().map(|c| c.is_authenticated()).unwrap_or(false)
    }

    fn load(&self) -> Result<Credentials> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials file: {:?}", self.path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {:?}", self.path))
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        let mut stamped = credentials.clone();
        stamped.last_updated = Utc::now();
        let content =
            serde_json::to_string_pretty(&stamped).context("Failed to serialize credentials")?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        self.write_private(&content)?;
        log::info!("Saved credentials to {:?}", self.path);
        Ok(())
    }
}

/// In-memory credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<Option<Credentials>>,
    saves: Mutex<usize>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts out authenticated
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Mutex::new(Some(credentials)),
            saves: Mutex::new(0),
        }
    }

    /// Number of `save` calls so far
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn exists(&self) -> bool {
        self.credentials
            .lock()
            .map(|c| c.as_ref().is_some_and(Credentials::is_authenticated))
            .unwrap_or(false)
    }

    fn load(&self) -> Result<Credentials> {
        self.credentials
            .lock()
            .map_err(|_| anyhow::anyhow!("Credential store lock poisoned"))?
            .clone()
            .context("No credentials stored")
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        let mut stamped = credentials.clone();
        stamped.last_updated = Utc::now();
        *self
            .credentials
            .lock()
            .map_err(|_| anyhow::anyhow!("Credential store lock poisoned"))? = Some(stamped);
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}

//! Persistence for the signed-in session.
//!
//! The file store writes through a temp file and renames it into place while
//! holding an exclusive lock on a sibling `.lock` file, so two processes never
//! interleave writes and readers never see a half-written session.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use thiserror::Error;

use crate::app::model::StoredUser;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access user store '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Stored user in '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode user: {0}")]
    Encode(#[source] serde_json::Error),
}

pub trait UserStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredUser>, StoreError>;
    fn save(&self, user: &StoredUser) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

pub struct FileUserStore {
    path: PathBuf,
}

impl FileUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_dir>/visits/user.json`, falling back to the current directory.
    pub fn default_path() -> PathBuf {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("visits").join("user.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn lock(&self) -> Result<File, StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.path.with_extension("lock"))
            .map_err(|e| self.io_error(e))?;
        FileExt::lock_exclusive(&lock).map_err(|e| self.io_error(e))?;
        Ok(lock)
    }
}

impl UserStore for FileUserStore {
    fn load(&self) -> Result<Option<StoredUser>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let user = serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(user))
    }

    fn save(&self, user: &StoredUser) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(user).map_err(StoreError::Encode)?;
        let lock = self.lock()?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp = File::create(&tmp_path).map_err(|e| self.io_error(e))?;
        tmp.write_all(&json).map_err(|e| self.io_error(e))?;
        tmp.sync_all().map_err(|e| self.io_error(e))?;
        drop(tmp);
        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))?;

        FileExt::unlock(&lock).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), "user saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let lock = self.lock()?;
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_error(e)),
        }
        FileExt::unlock(&lock).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryUserStore {
    user: Mutex<Option<StoredUser>>,
}

impl MemoryUserStore {
    pub fn with_user(user: StoredUser) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    pub fn stored(&self) -> Option<StoredUser> {
        self.user.lock().clone()
    }
}

impl UserStore for MemoryUserStore {
    fn load(&self) -> Result<Option<StoredUser>, StoreError> {
        Ok(self.user.lock().clone())
    }

    fn save(&self, user: &StoredUser) -> Result<(), StoreError> {
        *self.user.lock() = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.user.lock() = None;
        Ok(())
    }
}

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::AppResult;

pub const TOKEN_KEY: &str = "token";

/// Login token kept as `{"token": "..."}` on disk. Clones share state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: Option<PathBuf>,
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl SessionStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path),
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Arc::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn token(&self) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(TOKEN_KEY)
            .cloned()
    }

    pub fn set_token(&self, token: &str) -> AppResult<()> {
        {
            let mut entries = self
                .entries
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            entries.insert(TOKEN_KEY.to_string(), token.to_string());
        }
        self.persist()
    }

    /// Forget the token (logout).
    pub fn clear(&self) -> AppResult<()> {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(TOKEN_KEY);
        if removed.is_some() {
            tracing::info!("Session token cleared");
        }
        self.persist()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    fn persist(&self) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = {
            let entries = self
                .entries
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            serde_json::to_string_pretty(&*entries)?
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?;
            // mode() only applies when the file is created.
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
            file.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?;
            file.write_all(contents.as_bytes())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::open(&path).unwrap();
        assert_eq!(store.token(), None);
        store.set_token("tok123").unwrap();

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("tok123"));

        let raw = fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["token"], "tok123");
    }

    #[test]
    fn clear_removes_persisted_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::open(&path).unwrap();
        store.set_token("tok123").unwrap();
        store.clear().unwrap();

        assert!(!store.is_logged_in());
        assert_eq!(SessionStore::open(&path).unwrap().token(), None);
    }

    #[test]
    fn clones_share_state() {
        let store = SessionStore::in_memory();
        let other = store.clone();
        store.set_token("abc").unwrap();
        assert_eq!(other.token().as_deref(), Some("abc"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            SessionStore::open(&path),
            Err(crate::error::AppError::Corrupt(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        SessionStore::open(&path).unwrap().set_token("x").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_readable_file_is_made_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        SessionStore::open(&path).unwrap().set_token("x").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

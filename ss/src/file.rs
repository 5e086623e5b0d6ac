//! File-backed store

use eyre::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::KeyValueStore;

/// Durable store keeping one file per key
pub struct FileStore {
    /// Directory holding the value files
    base_path: PathBuf,
}

impl FileStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create session store directory")?;
        debug!(?base_path, "Opened session store");
        Ok(Self { base_path })
    }

    /// Default location: ~/.local/share/bizconsult/session on Linux
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bizconsult")
            .join("session")
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context(format!("Failed to read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).context(format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path).context(format!("Failed to replace {}", path.display()))?;
        debug!(%key, bytes = value.len(), "set: stored");
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context(format!("Failed to remove {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_values_survive_reopen() {
        let temp = tempdir().unwrap();

        let store = FileStore::open(temp.path()).unwrap();
        store.set("business_consultant_last_project", "proj-1").unwrap();
        drop(store);

        let reopened = FileStore::open(temp.path()).unwrap();
        assert_eq!(
            reopened.get("business_consultant_last_project").unwrap(),
            Some("proj-1".to_string())
        );
    }

    #[test]
    fn test_missing_key_is_none() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        assert_eq!(store.get("nothing").unwrap(), None);
    }

    #[test]
    fn test_clear_removes_file() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        store.set("token", "abc").unwrap();
        assert!(temp.path().join("token.json").exists());

        store.clear("token").unwrap();
        assert!(!temp.path().join("token.json").exists());
        store.clear("token").unwrap();
    }

    #[test]
    fn test_keys_are_sanitized() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        store.set("../escape/key", "v").unwrap();
        assert_eq!(store.get("../escape/key").unwrap(), Some("v".to_string()));
        assert!(temp.path().join("___escape_key.json").exists());
    }
}

//! SessionStore - durable key-value storage for client session continuity
//!
//! A small get/set/clear capability that the conversation engine and report
//! manager receive by injection, so neither depends on a concrete backend.
//!
//! - [`FileStore`] - one file per key under a base directory
//! - [`MemoryStore`] - in-process map for tests and throwaway sessions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use eyre::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Key under which the active conversation blob is kept
pub const CONVERSATION_KEY: &str = "business_consultant_conversation";

/// Key under which the last selected project id is kept
pub const LAST_PROJECT_KEY: &str = "business_consultant_last_project";

/// Key under which the bearer credential is kept
pub const TOKEN_KEY: &str = "token";

/// Key under which the signed-in identity is kept
pub const USER_INFO_KEY: &str = "userInfo";

/// Generic durable key-value capability
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn clear(&self, key: &str) -> Result<()>;
}

/// Read and deserialize a JSON value stored under `key`
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw).context(format!("Failed to parse stored value for {}", key))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Serialize `value` as JSON and store it under `key`
pub fn set_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).context(format!("Failed to serialize value for {}", key))?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        let sample = Sample {
            name: "goal".to_string(),
            count: 3,
        };

        set_json(&store, "sample", &sample).unwrap();
        let loaded: Option<Sample> = get_json(&store, "sample").unwrap();
        assert_eq!(loaded, Some(sample));

        let missing: Option<Sample> = get_json(&store, "missing").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_get_json_rejects_garbage() {
        let store = MemoryStore::new();
        store.set("sample", "{not json").unwrap();

        let result: Result<Option<Sample>> = get_json(&store, "sample");
        assert!(result.is_err());
    }
}

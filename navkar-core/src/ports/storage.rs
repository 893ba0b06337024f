//! Key-value storage port - durable string store for the session record

use crate::domain::result::Result;

/// Durable string key-value store
///
/// Plays the part of browser local storage: a flat namespace of string
/// keys and string values that survives process restarts. Implementations
/// must make `set` and `remove` visible to the next `get` on any handle.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` if the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Whether a key is present
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

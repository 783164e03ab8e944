//! Persisted-state trait for pluggable key/value backends.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::AppResult;

/// Trait for the string key/value store that holds browser-style persisted state.
///
/// Keys arrive fully namespaced; values are JSON documents. Every call is a
/// short synchronous read or write. Implementations report an unreachable
/// or full backend as an `ErrorKind::Storage` error.
pub trait StateStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get the raw value stored under `key`.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> AppResult<()>;

    /// List every stored key starting with `prefix`.
    fn keys(&self, prefix: &str) -> AppResult<Vec<String>>;
}

/// Typed JSON helpers available on every [`StateStore`], including trait objects.
pub trait StateStoreExt {
    /// Get a typed value by deserializing from JSON.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>>;

    /// Set a typed value by serializing to JSON.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()>;
}

impl<S: StateStore + ?Sized> StateStoreExt for S {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.get(key)? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.set(key, &json)
    }
}

//! Key/value persistence
//!
//! Backends:
//! - `FileStorage`: one JSON file per key in a data directory (native)
//! - `LocalStorage`: browser LocalStorage (wasm32)
//! - `MemoryStorage`: in-process map (tests, headless runs)

pub mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, default_storage};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Load a JSON value, falling back to `T::default()` when missing or corrupt
pub fn load_or_default<T>(storage: &dyn Storage, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match storage.get(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Corrupt '{}' ({}), resetting to default", key, e);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Could not read '{}': {}", key, e);
            T::default()
        }
    }
}

/// Serialize and store a JSON value, logging failures
pub fn save<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Could not serialize '{}': {}", key, e);
            return false;
        }
    };
    match storage.set(key, &json) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Could not write '{}': {}", key, e);
            false
        }
    }
}

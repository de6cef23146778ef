//! Local key/value persistence.
//!
//! The stores treat storage the way a browser treats `localStorage`: string
//! values under string keys, read once at startup and written after every
//! mutation. Two backends are provided:
//!
//! - [`MemoryStorage`] - process-local map, for tests and throwaway runs
//! - [`FileStorage`] - a single JSON document on disk, durable across restarts

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::path::PathBuf;

use thiserror::Error;

/// Keys under which the stores persist their state.
pub mod keys {
    /// Serialized list of cart line items.
    pub const CART: &str = "cart";

    /// Raw bearer credential.
    pub const AUTH_TOKEN: &str = "authToken";

    /// Serialized identity record.
    pub const USER: &str = "user";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        /// File the operation touched.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The backing document could not be encoded.
    #[error("storage encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A lock guarding the in-memory map was poisoned.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// String key/value store with `localStorage` semantics.
///
/// Methods take `&self` so one backend can be shared (behind an `Arc`) by the
/// cart store and the session holder.
pub trait LocalStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

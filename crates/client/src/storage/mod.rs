//! Durable client-side key-value storage.
//!
//! The storage layer is the localStorage analog: a flat string-to-string
//! document the session and cart stores write through on every mutation.
//! Stores receive an injected `Arc<dyn Storage>` rather than reading some
//! global location ad hoc, so tests swap in [`MemoryStorage`] and the two
//! stores can never disagree about where state lives.

mod file;
mod memory;

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Well-known storage keys.
///
/// These match the keys the storefront has always used, so an existing
/// on-disk document keeps working.
pub mod keys {
    /// Opaque auth credential. Presence means "authenticated".
    pub const TOKEN: &str = "token";

    /// Normalized session role (`CUSTOMER` or `ADMIN`).
    pub const ROLE: &str = "role";

    /// Display name, first part.
    pub const FIRSTNAME: &str = "firstname";

    /// Display name, last part.
    pub const LASTNAME: &str = "lastname";

    /// JSON-encoded array of cart line items.
    pub const CART: &str = "cart";
}

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be encoded.
    #[error("storage encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A durable string key-value store.
///
/// Writes are write-through: when a `put` returns, the value is in the
/// backing store. Reads of absent keys return `None`; a corrupt backing
/// document degrades to an empty one at open time rather than failing
/// reads.
///
/// `put_many`/`remove_many` apply all entries in one backing write, which
/// is what makes `login`/`logout` atomic at this layer.
pub trait Storage: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a single value through to the backing store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing write fails.
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Write several values in one backing write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing write fails.
    fn put_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Remove several keys in one backing write. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing write fails.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;

    /// Remove a single key. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing write fails.
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_many(&[key])
    }
}

/// JSON helpers over any [`Storage`].
pub trait StorageExt: Storage {
    /// Read and decode a JSON value.
    ///
    /// Absent or undecodable values yield `None`; decode failures are
    /// logged and treated as absence, never propagated (a corrupt cart
    /// must degrade to an empty cart).
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding corrupt stored value");
                None
            }
        }
    }

    /// Encode and write a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if encoding or the backing write fails.
    fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(StorageError::Encode)?;
        self.put(key, &raw)
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

/// Shared handle to a storage backend.
pub type SharedStorage = Arc<dyn Storage>;

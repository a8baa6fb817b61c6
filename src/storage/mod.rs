//! Durable key-value storage for the counter value.
//!
//! Storage is string-keyed and string-valued, the same shape as a browser's
//! `localStorage`, so a host binding can implement the trait directly.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

/// A string key-value store.
///
/// Writes are synchronous: once `set_item` returns `Ok`, a later `get_item`
/// for the same key (from any handle to the same backing store) sees the value.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

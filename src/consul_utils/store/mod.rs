//! # Storage Layer
//!
//! The [`KvStore`] trait is the only thing the pipelines know about Consul:
//! fetch a recursive snapshot under a root, write a key, delete a key or a
//! subtree, clear whatever cache sits in front of the store.
//!
//! ## Implementations
//!
//! - [`consul::ConsulStore`]: blocking HTTP client for Consul's `/v1/kv` API.
//!   Decodes the base64 `Value` field to text.
//! - [`cache::CachedStore`]: read-through disk cache in front of another
//!   store. Snapshots are keyed by host, port, root and fetched key, and
//!   expire after the configured TTL.
//! - [`memory::InMemoryStore`]: sorted in-memory map for tests. Clones share
//!   the same map.
//!
//! A [`StoreFactory`] opens a store for resolved [`Settings`]; paired
//! commands open one store per side.

use crate::config::Settings;
use crate::error::Result;
use crate::model::Record;

pub mod cache;
pub mod consul;
pub mod memory;

pub trait KvStore {
    /// Recursive fetch under `root`. `None` when nothing exists there.
    fn fetch(&self, root: &str) -> Result<Option<Vec<Record>>>;

    /// Create or overwrite a key.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a key, or every key under it when `recurse` is set.
    fn delete(&mut self, key: &str, recurse: bool) -> Result<()>;

    /// Drop cached snapshots. Stores without a cache do nothing.
    fn clear_cache(&mut self) -> Result<()>;
}

/// Opens a store for one set of connection settings.
pub trait StoreFactory {
    type Store: KvStore;

    fn open(&self, settings: &Settings) -> Result<Self::Store>;
}

/// Production factory: Consul over HTTP behind the disk cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsulStoreFactory;

impl StoreFactory for ConsulStoreFactory {
    type Store = cache::CachedStore<consul::ConsulStore>;

    fn open(&self, settings: &Settings) -> Result<Self::Store> {
        let consul = consul::ConsulStore::new(&settings.consul)?;
        Ok(cache::CachedStore::new(consul, settings))
    }
}

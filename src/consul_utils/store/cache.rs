use super::KvStore;
use crate::config::{ConsulConfig, Settings};
use crate::error::Result;
use crate::model::Record;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const ENTRY_EXT: &str = "json";

/// Cache key for a fetched key under a given store and root: the hex
/// SHA-256 of `host:port:root:field`, so file names stay 64 characters long
/// whatever the root.
pub fn cache_key(consul: &ConsulConfig, root: &str, field: &str) -> String {
    let namespace = format!("{}:{}:{}:{}", consul.host, consul.port, root, field);
    format!("{:x}", Sha256::digest(namespace.as_bytes()))
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    expires_at: DateTime<Utc>,
    records: Vec<Record>,
}

/// Directory of snapshot files, one JSON file per cache key.
///
/// Opened for each operation and dropped right after; nothing is held open
/// between calls.
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{ENTRY_EXT}"))
    }

    /// Cached records, or `None` on a miss. Expired and unreadable entries
    /// are removed and count as misses.
    pub fn get(&self, key: &str) -> Result<Option<Vec<Record>>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "dropping unreadable cache entry");
                fs::remove_file(&path)?;
                return Ok(None);
            }
        };
        if entry.expires_at <= Utc::now() {
            fs::remove_file(&path)?;
            return Ok(None);
        }
        Ok(Some(entry.records))
    }

    pub fn set(&self, key: &str, records: &[Record], ttl_secs: u64) -> Result<()> {
        let expires_at = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let entry = CacheEntry {
            expires_at,
            records: records.to_vec(),
        };
        fs::write(self.entry_path(key), serde_json::to_string(&entry)?)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXT) {
                fs::remove_file(path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Read-through cache in front of another store.
///
/// Only fetches are cached. Writes and deletes go straight to the inner
/// store, so a cached snapshot can be stale until its TTL runs out.
pub struct CachedStore<S: KvStore> {
    inner: S,
    consul: ConsulConfig,
    root: String,
    enabled: bool,
    dir: PathBuf,
    ttl: u64,
}

impl<S: KvStore> CachedStore<S> {
    pub fn new(inner: S, settings: &Settings) -> Self {
        Self {
            inner,
            consul: settings.consul.clone(),
            root: settings.default_root.clone(),
            enabled: settings.cache.enabled,
            dir: settings.cache.dir.clone(),
            ttl: settings.cache.ttl,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn key_for(&self, field: &str) -> String {
        cache_key(&self.consul, &self.root, field)
    }
}

impl<S: KvStore> KvStore for CachedStore<S> {
    fn fetch(&self, root: &str) -> Result<Option<Vec<Record>>> {
        if !self.enabled {
            return self.inner.fetch(root);
        }
        let key = self.key_for(root);
        match DiskCache::open(&self.dir).and_then(|cache| cache.get(&key)) {
            Ok(Some(records)) => {
                tracing::debug!(root, "hit from cache");
                return Ok(Some(records));
            }
            Ok(None) => tracing::debug!(root, "cache miss"),
            Err(e) => {
                tracing::warn!(root, error = %e, "cache unreadable, fetching from store")
            }
        }
        let fetched = self.inner.fetch(root)?;
        if let Some(records) = &fetched {
            let stored = DiskCache::open(&self.dir)
                .and_then(|cache| cache.set(&key, records, self.ttl));
            if let Err(e) = stored {
                tracing::warn!(root, error = %e, "could not write cache entry");
            }
        }
        Ok(fetched)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.inner.write(key, value)
    }

    fn delete(&mut self, key: &str, recurse: bool) -> Result<()> {
        self.inner.delete(key, recurse)
    }

    fn clear_cache(&mut self) -> Result<()> {
        if self.dir.exists() {
            let removed = DiskCache::open(&self.dir)?.clear()?;
            tracing::info!(removed, dir = %self.dir.display(), "cleared cache");
        }
        self.inner.clear_cache()
    }
}

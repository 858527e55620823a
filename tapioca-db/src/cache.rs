//! An LRU cache of decoded manifests keyed by build key, invalidated on
//! every write to the `builds` table (spec.md §4.7 `get_build`).

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use tapioca_hash::BuildKey;
use tapioca_manifest::Manifest;

/// Default number of decoded manifests kept resident.
pub const DEFAULT_CACHE_SIZE: usize = 64;

pub struct ManifestCache {
    cache: Mutex<LruCache<BuildKey, Manifest>>,
}

impl ManifestCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1");
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn get(&self, key: &BuildKey) -> Option<Manifest> {
        self.cache.lock().get(key).cloned()
    }

    pub fn put(&self, key: BuildKey, manifest: Manifest) {
        self.cache.lock().put(key, manifest);
    }

    /// Evict `key`, called on every write (`save_build`/`purge_build`) so
    /// the cache can never serve stale data.
    pub fn invalidate(&self, key: &BuildKey) {
        self.cache.lock().pop(key);
    }
}

impl Default for ManifestCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

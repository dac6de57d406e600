//! Cache of recently parsed objects.
//!
//! Resolution re-reads the same commits constantly (every `~n` step loads
//! a commit the previous step may have just produced), so the store keeps
//! parsed objects in an LRU keyed by id.

use std::num::NonZeroUsize;

use lru::LruCache;
use rev_hash::ObjectId;

use crate::Object;

pub struct ObjectCache {
    entries: LruCache<ObjectId, Object>,
}

impl ObjectCache {
    /// A cache holding up to `capacity` parsed objects (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Fetch a cached object, marking it as recently used.
    pub fn lookup(&mut self, id: &ObjectId) -> Option<&Object> {
        self.entries.get(id)
    }

    /// Remember a parsed object, possibly evicting the least recently
    /// used one.
    pub fn store(&mut self, id: ObjectId, obj: Object) {
        self.entries.put(id, obj);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

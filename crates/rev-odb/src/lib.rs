//! Object database for the revr revision resolver.
//!
//! Objects live as zlib-compressed loose files at `objects/XX/YYYY...`
//! where `XX` is the first byte of the OID in hex and `YYYY...` is the
//! rest. The file content is `"<type> <size>\0<content>"`.

mod enumerate;
pub mod prefix;
mod read;
mod write;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rev_hash::ObjectId;
use rev_object::cache::ObjectCache;
use rev_object::ObjectType;

pub use enumerate::LooseObjectIter;

/// Errors from object database operations.
#[derive(Debug, thiserror::Error)]
pub enum OdbError {
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    #[error("ambiguous object name: {prefix} matches {count} objects")]
    Ambiguous { prefix: String, count: usize },

    #[error("corrupt object {oid}: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("decompression error for {oid}: {source}")]
    Decompress {
        oid: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("object parse error: {0}")]
    Object(#[from] rev_object::ObjectError),

    #[error("hash error: {0}")]
    Hash(#[from] rev_hash::HashError),
}

/// Lightweight object info (header only, no content).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectInfo {
    pub obj_type: ObjectType,
    pub size: usize,
}

/// The object database: loose objects under an `objects/` directory.
pub struct ObjectDatabase {
    /// Path to the objects directory.
    objects_dir: PathBuf,
    /// Zlib compression level for writes.
    compression_level: flate2::Compression,
    /// Parsed-object cache.
    cache: Mutex<ObjectCache>,
}

impl ObjectDatabase {
    /// Open the object database at the given objects directory.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression_level: flate2::Compression::default(),
            cache: Mutex::new(ObjectCache::with_capacity(1024)),
        }
    }

    /// Set the zlib compression level (0–9).
    pub fn set_compression_level(&mut self, level: u32) {
        self.compression_level = flate2::Compression::new(level);
    }

    /// Get the file path for a given OID.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.loose_path())
    }

    /// Get the path to the objects directory.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    pub(crate) fn compression_level(&self) -> flate2::Compression {
        self.compression_level
    }

    pub(crate) fn cache(&self) -> &Mutex<ObjectCache> {
        &self.cache
    }

    /// Resolve an OID prefix to a full OID.
    /// Returns an error if the prefix is ambiguous.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<ObjectId, OdbError> {
        prefix::resolve_prefix(self, prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_layout() {
        let odb = ObjectDatabase::open("/tmp/objects");
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        assert_eq!(
            odb.object_path(&oid),
            PathBuf::from("/tmp/objects/da/39a3ee5e6b4b0d3255bfef95601890afd80709")
        );
    }

    #[test]
    fn set_compression_level() {
        let mut odb = ObjectDatabase::open("/tmp/objects");
        odb.set_compression_level(9);
    }
}

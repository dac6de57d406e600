pub(crate) mod loose;
pub mod packed;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rev_hash::ObjectId;

use crate::error::RefError;
use crate::name::RefName;
use crate::reflog::{self, ReflogEntry};
use crate::store::RefStore;
use crate::Reference;

use self::packed::PackedRefs;

/// Maximum depth for following symbolic ref chains.
const MAX_SYMREF_DEPTH: usize = 5;

/// Files-backend ref store (loose refs + packed-refs).
///
/// - Loose refs stored as individual files under `refs/`
/// - Packed refs in `packed-refs`
/// - Loose refs take precedence over packed refs
pub struct FilesRefStore {
    git_dir: PathBuf,
}

impl FilesRefStore {
    /// Create a new files-based ref store rooted at the git directory.
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the git directory path.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Resolve a ref name, following symbolic ref chains up to MAX_SYMREF_DEPTH.
    fn resolve_inner(
        &self,
        name: &RefName,
        depth: usize,
    ) -> Result<Option<ObjectId>, RefError> {
        if depth > MAX_SYMREF_DEPTH {
            return Err(RefError::SymrefLoop(name.to_string()));
        }

        match loose::read_loose_ref(&self.git_dir, name)? {
            Some(Reference::Direct { target, .. }) => Ok(Some(target)),
            Some(Reference::Symbolic { target, .. }) => self.resolve_inner(&target, depth + 1),
            None => {
                let packed = PackedRefs::load(&self.git_dir)?;
                Ok(packed.find(name).map(|pr| pr.oid))
            }
        }
    }

    /// Follow symbolic refs until a direct ref is reached, returning the
    /// name of the final ref and its OID.
    pub fn resolve_to_direct(
        &self,
        name: &RefName,
    ) -> Result<Option<(RefName, ObjectId)>, RefError> {
        let mut current = name.clone();
        for _ in 0..=MAX_SYMREF_DEPTH {
            match self.resolve(&current)? {
                Some(Reference::Direct { name, target }) => return Ok(Some((name, target))),
                Some(Reference::Symbolic { target, .. }) => current = target,
                None => return Ok(None),
            }
        }
        Err(RefError::SymrefLoop(name.to_string()))
    }

    /// Write a single ref directly.
    pub fn write_ref(&self, name: &RefName, oid: &ObjectId) -> Result<(), RefError> {
        loose::write_loose_ref(&self.git_dir, name, oid)
    }

    /// Write a symbolic ref directly.
    pub fn write_symbolic_ref(&self, name: &RefName, target: &RefName) -> Result<(), RefError> {
        loose::write_symbolic_ref(&self.git_dir, name, target)
    }

    /// Append a reflog entry for a ref.
    pub fn append_reflog(&self, name: &RefName, entry: &ReflogEntry) -> Result<(), RefError> {
        reflog::append_reflog_entry(&self.git_dir, name, entry)
    }

    /// Load the packed-refs file.
    pub fn packed_refs(&self) -> Result<PackedRefs, RefError> {
        PackedRefs::load(&self.git_dir)
    }
}

impl RefStore for FilesRefStore {
    fn resolve(&self, name: &RefName) -> Result<Option<Reference>, RefError> {
        match loose::read_loose_ref(&self.git_dir, name)? {
            Some(r) => Ok(Some(r)),
            None => {
                let packed = PackedRefs::load(&self.git_dir)?;
                Ok(packed.find(name).map(|pr| Reference::Direct {
                    name: pr.name.clone(),
                    target: pr.oid,
                }))
            }
        }
    }

    fn resolve_to_oid(&self, name: &RefName) -> Result<Option<ObjectId>, RefError> {
        self.resolve_inner(name, 0)
    }

    fn iter(
        &self,
        prefix: Option<&str>,
    ) -> Result<Box<dyn Iterator<Item = Result<Reference, RefError>> + '_>, RefError> {
        let loose_names = loose::enumerate_loose_refs(&self.git_dir, prefix)?;
        let mut seen: HashSet<String> = HashSet::new();

        let mut all_refs: Vec<Reference> = Vec::new();

        for name in &loose_names {
            seen.insert(name.as_str().to_string());
            match loose::read_loose_ref(&self.git_dir, name)? {
                Some(r) => all_refs.push(r),
                // File may have been deleted between enumerate and read
                None => {}
            }
        }

        let packed = PackedRefs::load(&self.git_dir)?;
        for pr in packed.refs() {
            if seen.contains(pr.name.as_str()) {
                continue; // Loose ref takes precedence
            }
            if let Some(p) = prefix {
                if !pr.name.as_str().starts_with(p) {
                    continue;
                }
            }
            all_refs.push(Reference::Direct {
                name: pr.name.clone(),
                target: pr.oid,
            });
        }

        all_refs.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(Box::new(all_refs.into_iter().map(Ok)))
    }

    fn reflog(&self, name: &RefName) -> Result<Vec<ReflogEntry>, RefError> {
        reflog::read_reflog(&self.git_dir, name)
    }
}

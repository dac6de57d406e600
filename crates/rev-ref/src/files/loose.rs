use std::fs;
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use rev_hash::ObjectId;

use crate::error::RefError;
use crate::name::RefName;
use crate::Reference;

/// Get the file path for a loose ref.
pub(crate) fn loose_ref_path(git_dir: &Path, name: &RefName) -> PathBuf {
    git_dir.join(name.as_str())
}

/// Read a loose ref file and return the Reference.
///
/// A loose ref is a file under `refs/` (or `HEAD`, etc.) containing either
/// a hex OID or `ref: <target-ref>`.
pub(crate) fn read_loose_ref(
    git_dir: &Path,
    name: &RefName,
) -> Result<Option<Reference>, RefError> {
    let path = loose_ref_path(git_dir, name);
    if !path.is_file() {
        return Ok(None);
    }

    let contents = fs::read(&path).map_err(|e| RefError::IoPath {
        path: path.clone(),
        source: e,
    })?;

    let trimmed = contents.trim();

    if let Some(target_name) = trimmed.strip_prefix(b"ref: ") {
        // Symbolic ref
        let target_str = std::str::from_utf8(target_name.trim())
            .map_err(|_| RefError::Parse("invalid UTF-8 in symbolic ref target".into()))?;
        let target = RefName::new(target_str)?;
        Ok(Some(Reference::Symbolic {
            name: name.clone(),
            target,
        }))
    } else {
        // Direct ref (hex OID)
        let hex = std::str::from_utf8(trimmed)
            .map_err(|_| RefError::Parse("invalid UTF-8 in ref OID".into()))?;
        let oid = ObjectId::from_hex(hex)?;
        Ok(Some(Reference::Direct {
            name: name.clone(),
            target: oid,
        }))
    }
}

/// Write a loose ref file.
pub(crate) fn write_loose_ref(
    git_dir: &Path,
    name: &RefName,
    oid: &ObjectId,
) -> Result<(), RefError> {
    let path = loose_ref_path(git_dir, name);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RefError::IoPath {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&path, format!("{}\n", oid.to_hex())).map_err(|e| RefError::IoPath {
        path: path.clone(),
        source: e,
    })
}

/// Write a symbolic ref file.
pub(crate) fn write_symbolic_ref(
    git_dir: &Path,
    name: &RefName,
    target: &RefName,
) -> Result<(), RefError> {
    let path = loose_ref_path(git_dir, name);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RefError::IoPath {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&path, format!("ref: {}\n", target)).map_err(|e| RefError::IoPath {
        path: path.clone(),
        source: e,
    })
}

/// Enumerate all loose refs under `refs/`, optionally filtered by prefix.
///
/// Returns ref names sorted lexicographically.
pub(crate) fn enumerate_loose_refs(
    git_dir: &Path,
    prefix: Option<&str>,
) -> Result<Vec<RefName>, RefError> {
    let refs_base = git_dir.join("refs");

    let mut result = Vec::new();
    if refs_base.is_dir() {
        collect_recursive(git_dir, &refs_base, &mut result)?;
    }

    if let Some(p) = prefix {
        result.retain(|name| name.as_str().starts_with(p));
    }

    result.sort();
    Ok(result)
}

fn collect_recursive(
    git_dir: &Path,
    dir: &Path,
    out: &mut Vec<RefName>,
) -> Result<(), RefError> {
    for entry in fs::read_dir(dir).map_err(|e| RefError::IoPath {
        path: dir.to_path_buf(),
        source: e,
    })? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(git_dir, &path, out)?;
        } else if path.is_file() {
            let rel = path
                .strip_prefix(git_dir)
                .map_err(|_| RefError::Parse("ref path outside git dir".into()))?;
            let rel_str = match rel.to_str() {
                Some(s) => s,
                None => continue,
            };
            // Lock files and other droppings are not refs.
            if let Ok(name) = RefName::new(rel_str) {
                out.push(name);
            }
        }
    }
    Ok(())
}

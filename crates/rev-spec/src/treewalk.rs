//! Tree-path descent (`<tree-ish>:<path>`).

use rev_hash::ObjectId;
use rev_object::{Object, ObjectType};
use rev_repository::Repository;

use crate::eval::read_object;
use crate::ResolveError;

/// Descend from a tree along a slash-separated path.
///
/// The empty path names the tree itself. Every intermediate component must
/// be a subtree; a missing name or a descent into a non-tree is not found.
/// A trailing `/` asserts the final entry is a tree.
pub(crate) fn entry_at_path(
    repo: &Repository,
    tree: ObjectId,
    path: &str,
) -> Result<(ObjectId, ObjectType), ResolveError> {
    if path.is_empty() {
        return Ok((tree, ObjectType::Tree));
    }

    let want_tree = path.ends_with('/');
    let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    if components.is_empty() {
        return Ok((tree, ObjectType::Tree));
    }

    let mut current = tree;
    let last = components.len() - 1;

    for (i, component) in components.iter().enumerate() {
        let obj = read_object(repo, current)?;
        let tree_obj = match obj {
            Object::Tree(t) => t,
            _ => {
                // Descending through a blob: the path cannot exist.
                return Err(ResolveError::NotFound(format!(
                    "'{}' is not under a tree",
                    path
                )));
            }
        };

        let entry = tree_obj.entry_named(component.as_bytes()).ok_or_else(|| {
            ResolveError::NotFound(format!("path '{}' does not exist", path))
        })?;

        if i < last {
            if !entry.mode.is_dir() {
                return Err(ResolveError::NotFound(format!(
                    "'{}' crosses a non-tree entry",
                    path
                )));
            }
            current = entry.oid;
        } else {
            if want_tree && !entry.mode.is_dir() {
                return Err(ResolveError::TypeMismatch {
                    expected: ObjectType::Tree,
                    actual: ObjectType::Blob,
                });
            }
            let kind = if entry.mode.is_dir() {
                ObjectType::Tree
            } else {
                // Gitlinks report as blob-ish: their target usually lives
                // in another repository and is never read here.
                ObjectType::Blob
            };
            return Ok((entry.oid, kind));
        }
    }

    // Unreachable: the loop returns on the last component.
    Err(ResolveError::NotFound(format!(
        "path '{}' does not exist",
        path
    )))
}

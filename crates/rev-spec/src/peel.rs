//! Tag-chain peeling and kind assertions.

use rev_hash::ObjectId;
use rev_object::{Object, ObjectType};
use rev_repository::Repository;

use crate::eval::read_object;
use crate::ResolveError;

/// Maximum tag-chain length before a repository is considered corrupt.
const MAX_PEEL_DEPTH: usize = 64;

/// Follow tag targets until the first non-tag object.
pub(crate) fn peel_to_non_tag(
    repo: &Repository,
    oid: ObjectId,
) -> Result<(ObjectId, ObjectType), ResolveError> {
    let mut current = oid;
    for _ in 0..MAX_PEEL_DEPTH {
        match read_object(repo, current)? {
            Object::Tag(tag) => current = tag.target,
            other => return Ok((current, other.object_type())),
        }
    }
    Err(ResolveError::Invalid(format!(
        "tag chain from {} exceeds {} links",
        oid, MAX_PEEL_DEPTH
    )))
}

/// Peel tags until an object of the wanted kind is reached.
///
/// A commit peels to its tree when a tree is wanted; any other kind
/// mismatch is an error.
pub(crate) fn peel_to_kind(
    repo: &Repository,
    oid: ObjectId,
    wanted: ObjectType,
) -> Result<ObjectId, ResolveError> {
    let mut current = oid;
    for _ in 0..MAX_PEEL_DEPTH {
        let obj = read_object(repo, current)?;
        let kind = obj.object_type();
        if kind == wanted {
            return Ok(current);
        }
        match obj {
            Object::Tag(tag) => current = tag.target,
            Object::Commit(commit) if wanted == ObjectType::Tree => return Ok(commit.tree),
            other => {
                return Err(ResolveError::TypeMismatch {
                    expected: wanted,
                    actual: other.object_type(),
                })
            }
        }
    }
    Err(ResolveError::Invalid(format!(
        "tag chain from {} exceeds {} links",
        oid, MAX_PEEL_DEPTH
    )))
}

/// Peel to a commit (what `^0`, `^n`, `~n` and `^{/…}` operate on).
pub(crate) fn peel_to_commit(
    repo: &Repository,
    oid: ObjectId,
) -> Result<ObjectId, ResolveError> {
    peel_to_kind(repo, oid, ObjectType::Commit)
}

/// Peel a tree-ish to its tree (what `:path` operates on).
pub(crate) fn peel_to_tree(repo: &Repository, oid: ObjectId) -> Result<ObjectId, ResolveError> {
    peel_to_kind(repo, oid, ObjectType::Tree)
}

//! Parent and ancestor navigation (`^n`, `~n`).

use rev_hash::ObjectId;
use rev_object::Object;
use rev_repository::Repository;

use crate::eval::read_object;
use crate::ResolveError;

/// The nth parent of a commit, 1-indexed. The caller has already peeled
/// `oid` to a commit.
pub(crate) fn nth_parent(
    repo: &Repository,
    oid: ObjectId,
    n: usize,
) -> Result<ObjectId, ResolveError> {
    debug_assert!(n >= 1);
    let commit = match read_object(repo, oid)? {
        Object::Commit(c) => c,
        other => {
            return Err(ResolveError::TypeMismatch {
                expected: rev_object::ObjectType::Commit,
                actual: other.object_type(),
            })
        }
    };

    match commit.parents.get(n - 1) {
        Some(&parent) => Ok(parent),
        None => Err(ResolveError::NotFound(format!(
            "parent {} of {} (it has {})",
            n,
            oid,
            commit.parents.len()
        ))),
    }
}

/// Walk n steps along the first-parent chain.
pub(crate) fn ancestor(
    repo: &Repository,
    oid: ObjectId,
    n: usize,
) -> Result<ObjectId, ResolveError> {
    let mut current = oid;
    for _ in 0..n {
        current = nth_parent(repo, current, 1)?;
    }
    Ok(current)
}

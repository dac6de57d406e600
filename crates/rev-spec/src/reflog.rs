//! Reflog-anchored operators: `@{n}`, `@{<date>}`, `@{-n}`.

use bstr::ByteSlice;
use regex::Regex;
use rev_hash::ObjectId;
use rev_ref::{RefName, RefStore};
use rev_repository::Repository;

use crate::ResolveError;

/// `@{n}`: the nth most recent reflog entry's post-state.
pub(crate) fn ordinal(
    repo: &Repository,
    name: &RefName,
    n: usize,
) -> Result<ObjectId, ResolveError> {
    let entries = repo.refs().reflog(name)?;
    match entries.get(n) {
        Some(entry) => Ok(entry.new_oid),
        None => Err(ResolveError::NotFound(format!(
            "reflog for '{}' has {} entries, position {} requested",
            name,
            entries.len(),
            n
        ))),
    }
}

/// `@{<date>}`: the value the ref had at time `at`.
///
/// Each entry is valid from its own timestamp until the next newer entry's;
/// the newest entry is valid forever. A time before the oldest entry finds
/// nothing.
pub(crate) fn at_time(
    repo: &Repository,
    name: &RefName,
    at: i64,
) -> Result<ObjectId, ResolveError> {
    let entries = repo.refs().reflog(name)?;

    // Entries are newest first; walk from the oldest and keep the last one
    // whose timestamp is at or before the requested time.
    let mut found = None;
    for entry in entries.iter().rev() {
        if entry.identity.date.timestamp <= at {
            found = Some(entry.new_oid);
        } else {
            break;
        }
    }

    found.ok_or_else(|| {
        ResolveError::NotFound(format!(
            "reflog for '{}' does not reach back to timestamp {}",
            name, at
        ))
    })
}

/// `@{-n}`: the branch that was checked out n switches ago, per HEAD's
/// reflog. Returns the branch ref; the caller resolves its current tip.
pub(crate) fn prior_checkout(repo: &Repository, n: usize) -> Result<RefName, ResolveError> {
    debug_assert!(n >= 1);

    // Infallible: the pattern is a literal with one capture group.
    let pattern = Regex::new("checkout: moving from (.*) to .*")
        .map_err(|e| ResolveError::InvalidRegex(e.to_string()))?;

    let head = RefName::new("HEAD")?;
    let entries = repo.refs().reflog(&head)?;

    let mut remaining = n;
    for entry in &entries {
        let message = entry.message.to_str_lossy();
        if let Some(captures) = pattern.captures(&message) {
            remaining -= 1;
            if remaining == 0 {
                let source = &captures[1];
                return RefName::new(format!("refs/heads/{}", source))
                    .map_err(|_| ResolveError::NotFound(source.to_string()));
            }
        }
    }

    Err(ResolveError::NotFound(format!(
        "HEAD has only {} checkout entries, @{{-{}}} requested",
        n - remaining,
        n
    )))
}

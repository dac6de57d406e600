//! Commit-message search (`^{/pattern}` and `:/pattern`).

use std::collections::{HashSet, VecDeque};

use bstr::ByteSlice;
use regex::Regex;
use rev_hash::ObjectId;
use rev_object::Object;
use rev_repository::Repository;

use crate::eval::read_object;
use crate::peel;
use crate::ResolveError;

fn compile(pattern: &str) -> Result<Regex, ResolveError> {
    Regex::new(pattern).map_err(|e| ResolveError::InvalidRegex(e.to_string()))
}

/// `^{/pattern}`: breadth-first over history from `start`, returning the
/// first commit whose message matches. Matching is case-sensitive and
/// unanchored.
pub(crate) fn from_commit(
    repo: &Repository,
    start: ObjectId,
    pattern: &str,
) -> Result<ObjectId, ResolveError> {
    let regex = compile(pattern)?;
    walk(repo, std::iter::once(start), &regex).ok_or_else(|| {
        ResolveError::NotFound(format!("no commit reachable from {} matches the pattern", start))
    })
}

/// `:/pattern`: search from every ref tip.
///
/// Tips are seeded in lexicographic refname order and the walk proceeds
/// breadth-first across the union, so the result is deterministic for a
/// fixed store. Tag tips are unwrapped; refs that do not point at commits
/// are skipped.
pub(crate) fn from_all_refs(
    repo: &Repository,
    pattern: &str,
) -> Result<ObjectId, ResolveError> {
    use rev_ref::RefStore;

    let regex = compile(pattern)?;

    let mut tips = Vec::new();
    for reference in repo.refs().iter(Some("refs/"))? {
        let reference = reference?;
        let tip = match reference.target_oid() {
            Some(oid) => oid,
            None => match repo.refs().resolve_to_oid(reference.name())? {
                Some(oid) => oid,
                None => continue,
            },
        };
        match peel::peel_to_non_tag(repo, tip) {
            Ok((peeled, rev_object::ObjectType::Commit)) => tips.push(peeled),
            Ok(_) => continue,
            Err(ResolveError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    walk(repo, tips.into_iter(), &regex)
        .ok_or_else(|| ResolveError::NotFound("no commit matches the pattern".into()))
}

/// Breadth-first walk over commits, first match wins.
fn walk(
    repo: &Repository,
    seeds: impl Iterator<Item = ObjectId>,
    regex: &Regex,
) -> Option<ObjectId> {
    let mut queue: VecDeque<ObjectId> = VecDeque::new();
    let mut seen: HashSet<ObjectId> = HashSet::new();

    for seed in seeds {
        if seen.insert(seed) {
            queue.push_back(seed);
        }
    }

    while let Some(oid) = queue.pop_front() {
        let commit = match read_object(repo, oid) {
            Ok(Object::Commit(c)) => c,
            _ => continue,
        };

        if regex.is_match(&commit.message.to_str_lossy()) {
            return Some(oid);
        }

        for &parent in &commit.parents {
            if seen.insert(parent) {
                queue.push_back(parent);
            }
        }
    }

    None
}

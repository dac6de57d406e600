//! Revision expression resolution.
//!
//! Turns a textual revspec (`master@{u}~2^{tree}:path/file.txt`,
//! `e90810b^{/fixup}`, `HEAD@{2 days ago}`) into a single object id.
//!
//! The grammar is `Base Suffix*`: the Base names a starting object (a ref,
//! `HEAD`, `@`, a hex prefix, or a describe-style `name-N-ghex`), and each
//! suffix operator transforms the current object:
//!
//! - `^n`: nth parent; `^0` peels to a commit without moving
//! - `^{}`: unwrap tag chains to the first non-tag object
//! - `^{commit}` / `^{tree}` / `^{blob}` / `^{tag}`: peel and assert kind
//! - `^{/regex}`: first reachable commit whose message matches
//! - `~n`: nth first-parent ancestor
//! - `@{n}` / `@{<date>}`: reflog lookup by ordinal or time
//! - `@{upstream}` / `@{u}`: the configured upstream branch
//! - `@{-n}`: the nth previously checked-out branch
//! - `:path`: descend from a tree-ish into a tree entry
//!
//! A leading `:/regex` searches the whole repository instead.
//!
//! Failures are reported as distinct [`ResolveError`] kinds so callers can
//! tell a malformed expression from a missing object from an ambiguous
//! abbreviation.

mod ancestry;
mod base;
mod date;
mod eval;
mod lexer;
mod peel;
mod reflog;
mod search;
mod treewalk;
mod upstream;

use rev_hash::ObjectId;
use rev_object::ObjectType;
use rev_ref::RefName;
use rev_repository::Repository;

/// Errors produced while resolving a revision expression.
///
/// The first seven variants are the interesting ones for callers; the rest
/// propagate collaborator failures (I/O, corrupt data) unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The expression is not well formed.
    #[error("invalid revision expression: {0}")]
    Invalid(String),

    /// Well formed, but no such object, ref, reflog entry, or path.
    #[error("revision not found: {0}")]
    NotFound(String),

    /// A hex prefix matched more than one object (or was too short).
    #[error("short object id '{0}' is ambiguous")]
    Ambiguous(String),

    /// A `^{kind}` assertion (or an operator's implicit peel) failed.
    #[error("expected a {expected}, found a {actual}")]
    TypeMismatch {
        expected: ObjectType,
        actual: ObjectType,
    },

    /// `^{word}` with an unrecognized kind keyword.
    #[error("'{0}' is not a valid object kind")]
    InvalidKindKeyword(String),

    /// `@{upstream}` on a branch without `branch.*.remote` / `branch.*.merge`.
    #[error("no upstream configured for branch '{0}'")]
    UpstreamNotConfigured(String),

    /// The pattern in `^{/…}` or `:/…` does not compile.
    #[error("invalid pattern: {0}")]
    InvalidRegex(String),

    /// Object store failure other than a failed lookup.
    #[error("object store error: {0}")]
    Odb(#[source] rev_odb::OdbError),

    /// Reference store failure other than a failed lookup.
    #[error("reference store error: {0}")]
    Ref(#[source] rev_ref::RefError),

    /// Repository-level failure.
    #[error(transparent)]
    Repo(#[from] rev_repository::RepoError),
}

impl From<rev_odb::OdbError> for ResolveError {
    fn from(e: rev_odb::OdbError) -> Self {
        match e {
            rev_odb::OdbError::NotFound(oid) => ResolveError::NotFound(oid.to_hex()),
            rev_odb::OdbError::Ambiguous { prefix, .. } => ResolveError::Ambiguous(prefix),
            other => ResolveError::Odb(other),
        }
    }
}

impl From<rev_ref::RefError> for ResolveError {
    fn from(e: rev_ref::RefError) -> Self {
        match e {
            rev_ref::RefError::NotFound(name) => ResolveError::NotFound(name),
            rev_ref::RefError::InvalidName(name) => ResolveError::Invalid(name),
            other => ResolveError::Ref(other),
        }
    }
}

impl From<rev_object::ObjectError> for ResolveError {
    fn from(e: rev_object::ObjectError) -> Self {
        ResolveError::Odb(rev_odb::OdbError::Object(e))
    }
}

impl From<rev_config::ConfigError> for ResolveError {
    fn from(e: rev_config::ConfigError) -> Self {
        ResolveError::Invalid(e.to_string())
    }
}

/// Resolve a revision expression to a single object id.
pub fn resolve(repo: &Repository, spec: &str) -> Result<ObjectId, ResolveError> {
    resolve_ext(repo, spec).map(|(oid, _)| oid)
}

/// Resolve a revision expression, additionally reporting the reference the
/// expression was anchored to (when the Base named one, directly or through
/// `@{-n}` / `@{upstream}`).
pub fn resolve_ext(
    repo: &Repository,
    spec: &str,
) -> Result<(ObjectId, Option<RefName>), ResolveError> {
    eval::Evaluator::new(repo).resolve(spec)
}

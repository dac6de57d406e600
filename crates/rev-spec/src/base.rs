//! Base resolution: the leading name of a revision expression.
//!
//! Precedence: a full 40-hex id naming an existing object wins outright;
//! otherwise refs win over abbreviations (the DWIM candidate list below),
//! then describe-style output (`name-N-ghex`), then object-id prefixes.

use regex::Regex;
use rev_hash::{hex::is_hex_digits, ObjectId, HEX_LEN};
use rev_ref::{RefName, RefStore};
use rev_repository::Repository;

use crate::ResolveError;

/// Result of resolving a Base.
pub(crate) struct BaseResolution {
    pub oid: ObjectId,
    /// The matched ref, when the Base named one. This is the ref whose
    /// reflog later `@{…}` operators read.
    pub reference: Option<RefName>,
}

/// The DWIM search list: the candidate refnames tried, in order, for a
/// short name.
fn dwim_candidates(name: &str) -> Vec<String> {
    let mut candidates = Vec::with_capacity(6);
    if name.starts_with("refs/") {
        candidates.push(name.to_string());
    }
    candidates.push(format!("refs/{}", name));
    candidates.push(format!("refs/tags/{}", name));
    candidates.push(format!("refs/heads/{}", name));
    candidates.push(format!("refs/remotes/{}", name));
    candidates.push(format!("refs/remotes/{}/HEAD", name));
    candidates
}

pub(crate) fn resolve_base(
    repo: &Repository,
    base: &str,
) -> Result<BaseResolution, ResolveError> {
    // HEAD and its alias '@'.
    if base == "HEAD" || base == "@" {
        let head = RefName::new("HEAD")?;
        let oid = repo
            .head_oid()?
            .ok_or_else(|| ResolveError::NotFound("HEAD".into()))?;
        return Ok(BaseResolution {
            oid,
            reference: Some(head),
        });
    }

    // A full hex id that names an existing object is that object, even if
    // a ref of the same name exists.
    if base.len() == HEX_LEN && is_hex_digits(base) {
        let oid = ObjectId::from_hex(base)
            .map_err(|_| ResolveError::Invalid(base.to_string()))?;
        if repo.odb().contains(&oid) {
            return Ok(BaseResolution {
                oid,
                reference: None,
            });
        }
    }

    // Refs, via the DWIM list.
    for candidate in dwim_candidates(base) {
        let name = match RefName::new(candidate.as_str()) {
            Ok(name) => name,
            Err(_) => continue,
        };
        if repo.refs().resolve(&name)?.is_some() {
            let oid = repo
                .refs()
                .resolve_to_oid(&name)?
                .ok_or_else(|| ResolveError::NotFound(name.to_string()))?;
            return Ok(BaseResolution {
                oid,
                reference: Some(name),
            });
        }
    }

    // Object-id prefix.
    if is_hex_digits(base) && base.len() <= HEX_LEN {
        let oid = repo.odb().resolve_prefix(base).map_err(|e| match e {
            rev_odb::OdbError::NotFound(_) => ResolveError::NotFound(base.to_string()),
            other => ResolveError::from(other),
        })?;
        return Ok(BaseResolution {
            oid,
            reference: None,
        });
    }

    // Describe output: `name-N-ghex` names the abbreviated object.
    // Infallible pattern: a literal with one capture group.
    if let Ok(describe) = Regex::new(r"-\d+-g([0-9a-fA-F]+)$") {
        if let Some(captures) = describe.captures(base) {
            let hex = &captures[1];
            let oid = repo.odb().resolve_prefix(hex).map_err(|e| match e {
                rev_odb::OdbError::NotFound(_) => ResolveError::NotFound(base.to_string()),
                other => ResolveError::from(other),
            })?;
            return Ok(BaseResolution {
                oid,
                reference: None,
            });
        }
    }

    // Nothing matched: the distinction between "well-formed but absent"
    // and "not a name at all" comes from refname validity.
    if RefName::new(format!("refs/heads/{}", base)).is_ok() {
        Err(ResolveError::NotFound(base.to_string()))
    } else {
        Err(ResolveError::Invalid(base.to_string()))
    }
}

//! `@{upstream}` resolution through branch configuration.

use rev_ref::RefName;
use rev_repository::Repository;

use crate::ResolveError;

/// The upstream ref of a local branch, per `branch.<name>.remote` and
/// `branch.<name>.merge`.
///
/// A remote of `"."` binds to the local ref named by `merge`; anything else
/// maps into that remote's `refs/remotes/<remote>/…` namespace.
pub(crate) fn upstream_ref(
    repo: &Repository,
    branch: &RefName,
) -> Result<RefName, ResolveError> {
    if !branch.is_branch() {
        return Err(ResolveError::Invalid(format!(
            "'{}' is not a local branch, it has no upstream",
            branch
        )));
    }

    let short = branch.short_name().to_string();
    let remote = repo
        .config()
        .get_string(&format!("branch.{}.remote", short))?;
    let merge = repo
        .config()
        .get_string(&format!("branch.{}.merge", short))?;

    let (remote, merge) = match (remote, merge) {
        (Some(r), Some(m)) => (r, m),
        _ => return Err(ResolveError::UpstreamNotConfigured(short)),
    };

    if remote == "." {
        return RefName::new(merge.as_str())
            .map_err(|_| ResolveError::UpstreamNotConfigured(short));
    }

    let merge_short = merge.strip_prefix("refs/heads/").unwrap_or(&merge);
    RefName::new(format!("refs/remotes/{}/{}", remote, merge_short))
        .map_err(|_| ResolveError::UpstreamNotConfigured(short))
}

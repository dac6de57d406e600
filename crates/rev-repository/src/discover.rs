use std::path::{Path, PathBuf};

use crate::RepoError;

/// Check whether a directory looks like a git directory.
pub(crate) fn is_git_dir(path: &Path) -> bool {
    path.join("HEAD").is_file() && path.join("objects").is_dir() && path.join("refs").is_dir()
}

/// Validate and return a git directory path.
pub(crate) fn open_git_dir(path: &Path) -> Result<PathBuf, RepoError> {
    if !is_git_dir(path) {
        return Err(RepoError::InvalidGitDir {
            path: path.to_path_buf(),
            reason: "missing HEAD, objects/ or refs/".into(),
        });
    }
    Ok(path.to_path_buf())
}

/// Resolve the git directory for a working tree root (its `.git` entry).
///
/// A `.git` file containing `gitdir: <path>` redirects to a detached git
/// directory.
pub(crate) fn open_git_dir_from_work_tree(work_tree: &Path) -> Result<PathBuf, RepoError> {
    let dot_git = work_tree.join(".git");

    if dot_git.is_dir() {
        return open_git_dir(&dot_git);
    }

    if dot_git.is_file() {
        let target = parse_gitdir_file(&dot_git)?;
        let target = if target.is_absolute() {
            target
        } else {
            work_tree.join(&target)
        };
        let target = std::fs::canonicalize(&target).map_err(|e| RepoError::InvalidGitDir {
            path: dot_git.clone(),
            reason: format!("cannot resolve gitdir target: {e}"),
        })?;
        return open_git_dir(&target);
    }

    Err(RepoError::NotFound(work_tree.to_path_buf()))
}

/// Discover a git directory by walking up from `start`.
pub(crate) fn discover_git_dir(start: &Path) -> Result<PathBuf, RepoError> {
    let start = std::fs::canonicalize(start)
        .map_err(|_| RepoError::NotFound(start.to_path_buf()))?;

    let mut current = start.clone();
    loop {
        let dot_git = current.join(".git");
        if dot_git.is_dir() || dot_git.is_file() {
            return open_git_dir_from_work_tree(&current);
        }

        // The directory itself may be a bare repository.
        if is_git_dir(&current) {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => return Err(RepoError::NotFound(start)),
        }
    }
}

/// Parse a `.git` file: `gitdir: <path>`.
fn parse_gitdir_file(path: &Path) -> Result<PathBuf, RepoError> {
    let contents = std::fs::read_to_string(path)?;
    let line = contents.trim();
    let target = line
        .strip_prefix("gitdir:")
        .ok_or_else(|| RepoError::InvalidGitDir {
            path: path.to_path_buf(),
            reason: "missing 'gitdir:' prefix".into(),
        })?
        .trim();
    Ok(PathBuf::from(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_git_dir(path: &Path) {
        fs::create_dir_all(path.join("objects")).unwrap();
        fs::create_dir_all(path.join("refs")).unwrap();
        fs::write(path.join("HEAD"), "ref: refs/heads/main\n").unwrap();
    }

    #[test]
    fn detects_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_git_dir(dir.path()));
        make_git_dir(dir.path());
        assert!(is_git_dir(dir.path()));
    }

    #[test]
    fn opens_work_tree_with_dot_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        make_git_dir(&dir.path().join(".git"));
        let found = open_git_dir_from_work_tree(dir.path()).unwrap();
        assert_eq!(found, dir.path().join(".git"));
    }

    #[test]
    fn follows_gitdir_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real-git");
        make_git_dir(&real);
        let wt = dir.path().join("wt");
        fs::create_dir_all(&wt).unwrap();
        fs::write(wt.join(".git"), format!("gitdir: {}\n", real.display())).unwrap();

        let found = open_git_dir_from_work_tree(&wt).unwrap();
        assert_eq!(found, fs::canonicalize(&real).unwrap());
    }

    #[test]
    fn discovery_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        make_git_dir(&dir.path().join(".git"));
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let found = discover_git_dir(&nested).unwrap();
        assert!(found.ends_with(".git"));
    }

    #[test]
    fn discovery_finds_bare_repo() {
        let dir = tempfile::tempdir().unwrap();
        make_git_dir(dir.path());
        let found = discover_git_dir(dir.path()).unwrap();
        assert_eq!(found, fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn discovery_failure() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover_git_dir(dir.path()),
            Err(RepoError::NotFound(_))
        ));
    }
}

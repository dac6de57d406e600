//! Repository discovery and central access for all subsystems the revision
//! resolver consults: the object database, the reference store, the
//! configuration, and the clock.

mod discover;
mod error;

pub use error::RepoError;

use std::path::{Path, PathBuf};

use rev_config::Config;
use rev_hash::ObjectId;
use rev_odb::ObjectDatabase;
use rev_ref::{FilesRefStore, RefName, RefStore, Reference};
use rev_utils::date::Clock;

/// The central repository handle tying the collaborator subsystems together.
pub struct Repository {
    /// Path to the git directory.
    git_dir: PathBuf,
    /// Object database.
    odb: ObjectDatabase,
    /// Reference store.
    refs: FilesRefStore,
    /// Repository-local configuration.
    config: Config,
    /// Wall clock used for relative date expressions.
    clock: Clock,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("git_dir", &self.git_dir)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Open an existing repository at the given path.
    ///
    /// `path` may point to the git directory itself (bare layout) or to a
    /// working tree root containing `.git`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref();
        let git_dir = if path.join("HEAD").is_file() && path.join("objects").is_dir() {
            discover::open_git_dir(path)?
        } else if path.join(".git").exists() {
            discover::open_git_dir_from_work_tree(path)?
        } else {
            return Err(RepoError::NotFound(path.to_path_buf()));
        };
        Self::from_git_dir(git_dir)
    }

    /// Discover a repository starting from the given directory, walking up.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, RepoError> {
        let git_dir = discover::discover_git_dir(start.as_ref())?;
        Self::from_git_dir(git_dir)
    }

    fn from_git_dir(git_dir: PathBuf) -> Result<Self, RepoError> {
        let odb = ObjectDatabase::open(git_dir.join("objects"));
        let refs = FilesRefStore::new(&git_dir);
        let config = Config::load(&git_dir)?;

        Ok(Repository {
            git_dir,
            odb,
            refs,
            config,
            clock: Clock::System,
        })
    }

    /// Path to the git directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Access the object database.
    pub fn odb(&self) -> &ObjectDatabase {
        &self.odb
    }

    /// Access the reference store.
    pub fn refs(&self) -> &FilesRefStore {
        &self.refs
    }

    /// Access the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The clock consulted for relative date expressions.
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Replace the clock (pin "now" for deterministic resolution).
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Resolve HEAD to an OID.
    pub fn head_oid(&self) -> Result<Option<ObjectId>, RepoError> {
        let head = RefName::new("HEAD")?;
        Ok(self.refs.resolve_to_oid(&head)?)
    }

    /// The branch HEAD points at (None when detached or unborn-and-direct).
    pub fn head_target(&self) -> Result<Option<RefName>, RepoError> {
        let head = RefName::new("HEAD")?;
        match self.refs.resolve(&head)? {
            Some(Reference::Symbolic { target, .. }) => Ok(Some(target)),
            Some(Reference::Direct { .. }) | None => Ok(None),
        }
    }
}

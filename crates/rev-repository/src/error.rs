use std::path::PathBuf;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a git repository (or any of the parent directories): {0}")]
    NotFound(PathBuf),

    #[error("invalid git directory: {path}: {reason}")]
    InvalidGitDir { path: PathBuf, reason: String },

    #[error("unable to read HEAD: {0}")]
    InvalidHead(String),

    #[error(transparent)]
    Config(#[from] rev_config::ConfigError),

    #[error(transparent)]
    Odb(#[from] rev_odb::OdbError),

    #[error(transparent)]
    Ref(#[from] rev_ref::RefError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

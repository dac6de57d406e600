//! Repository configuration reader.
//!
//! Parses the INI-style `config` file in a git directory and answers key
//! lookups like `branch.main.remote`. This is a read-only, repo-local view:
//! the resolver only ever consults branch upstream bindings, so system and
//! global scopes, includes, and writes are out of scope.

mod parse;

use std::path::Path;

use bstr::{BString, ByteSlice};

pub use parse::parse_config;

/// Errors from configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config key: {0}")]
    InvalidKey(String),

    #[error("config parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A normalized configuration key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    /// Lowercased section name.
    pub section: BString,
    /// Case-preserved subsection name (optional).
    pub subsection: Option<BString>,
    /// Lowercased variable name.
    pub name: BString,
}

impl ConfigKey {
    /// Parse from "section.name" or "section.subsection.name".
    ///
    /// Section and variable names are lowercased. The subsection preserves
    /// case and may itself contain dots: the section is everything before
    /// the first dot, the name everything after the last.
    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidKey("empty key".into()));
        }

        let first_dot = key.find('.').ok_or_else(|| {
            ConfigError::InvalidKey(format!("key must contain at least one dot: {}", key))
        })?;

        let section = &key[..first_dot];
        let rest = &key[first_dot + 1..];

        if rest.is_empty() {
            return Err(ConfigError::InvalidKey(format!(
                "key must have a variable name after the dot: {}",
                key
            )));
        }

        let (subsection, name) = if let Some(last_dot) = rest.rfind('.') {
            let sub = &rest[..last_dot];
            let name = &rest[last_dot + 1..];
            if name.is_empty() {
                return Err(ConfigError::InvalidKey(format!(
                    "key must have a variable name after the last dot: {}",
                    key
                )));
            }
            (Some(BString::from(sub.as_bytes())), name)
        } else {
            (None, rest)
        };

        Ok(ConfigKey {
            section: BString::from(section.to_ascii_lowercase().as_bytes()),
            subsection,
            name: BString::from(name.to_ascii_lowercase().as_bytes()),
        })
    }

    /// Format as the canonical "section.subsection.name" string.
    pub fn to_canonical(&self) -> String {
        if let Some(ref sub) = self.subsection {
            format!(
                "{}.{}.{}",
                self.section.to_str_lossy(),
                sub.to_str_lossy(),
                self.name.to_str_lossy()
            )
        } else {
            format!(
                "{}.{}",
                self.section.to_str_lossy(),
                self.name.to_str_lossy()
            )
        }
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_canonical())
    }
}

/// A single configuration key-value pair.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    /// The full key.
    pub key: ConfigKey,
    /// The raw value (None for boolean keys written with no `=`).
    pub value: Option<BString>,
}

/// Parsed repository configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    entries: Vec<ConfigEntry>,
}

impl Config {
    /// An empty configuration.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse configuration from raw bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ConfigError> {
        Ok(Self {
            entries: parse_config(data)?,
        })
    }

    /// Load the `config` file in a git directory.
    ///
    /// A missing file loads as an empty configuration.
    pub fn load(git_dir: &Path) -> Result<Self, ConfigError> {
        let path = git_dir.join("config");
        if !path.is_file() {
            return Ok(Self::empty());
        }
        let data = std::fs::read(&path)?;
        Self::from_bytes(&data)
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    /// Get the last value for a key (last-one-wins, as in git).
    pub fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let wanted = ConfigKey::parse(key)?;
        let mut found = None;
        for entry in &self.entries {
            if entry.key == wanted {
                found = entry.value.clone();
            }
        }
        Ok(found.map(|v| v.to_str_lossy().into_owned()))
    }
}

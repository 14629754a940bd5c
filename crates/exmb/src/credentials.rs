//! Per-alias credential files.
//!
//! Each alias lives in `<dir>/<alias>.json`. Tokens are obtained elsewhere;
//! this store only reads and writes them.

use exmb_error::{ConfigError, ExmbError, ExmbResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Reddit OAuth access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditCredential {
    /// Bearer token.
    pub access_token: String,
}

/// Discord bot used to message the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordCredential {
    /// Bot token.
    pub bot_token: String,
    /// User that receives status messages.
    pub owner_id: u64,
}

/// Everything stored under one alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Reddit account.
    pub reddit: RedditCredential,
    /// Optional status channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordCredential>,
}

impl Credential {
    /// Reddit-only credential.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            reddit: RedditCredential {
                access_token: access_token.into(),
            },
            discord: None,
        }
    }

    /// Attach a Discord bot.
    pub fn with_discord(mut self, bot_token: impl Into<String>, owner_id: u64) -> Self {
        self.discord = Some(DiscordCredential {
            bot_token: bot_token.into(),
            owner_id,
        });
        self
    }
}

/// Directory of alias files.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.config/exmb`.
    pub fn default_location() -> ExmbResult<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            ExmbError::from(ConfigError::new("Could not determine home directory"))
        })?;
        Ok(Self::new(home.join(".config/exmb")))
    }

    /// Directory holding the alias files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, alias: &str) -> PathBuf {
        self.dir.join(format!("{}.json", alias))
    }

    /// Sorted alias names. A missing directory has none.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn aliases(&self) -> ExmbResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ConfigError::new(format!(
                    "Failed to read credential directory {}: {}",
                    self.dir.display(),
                    e
                ))
                .into());
            }
        };

        let mut aliases = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ExmbError::from(ConfigError::new(format!(
                    "Failed to read credential directory entry: {}",
                    e
                )))
            })?;
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                aliases.push(stem.to_string());
            }
        }
        aliases.sort();
        debug!(count = aliases.len(), "Listed credential aliases");
        Ok(aliases)
    }

    /// Read `alias`, failing when it was never stored.
    #[instrument(skip(self))]
    pub fn load(&self, alias: &str) -> ExmbResult<Credential> {
        validate_alias(alias)?;
        let path = self.path_for(alias);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::new(format!(
                    "No authorization alias '{}' found",
                    alias
                ))
                .into());
            }
            Err(e) => {
                return Err(ConfigError::new(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                ))
                .into());
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            ExmbError::from(ConfigError::new(format!(
                "Malformed credential file {}: {}",
                path.display(),
                e
            )))
        })
    }

    /// Write `alias`, replacing any previous value.
    #[instrument(skip(self, credential))]
    pub fn save(&self, alias: &str, credential: &Credential) -> ExmbResult<()> {
        validate_alias(alias)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            ExmbError::from(ConfigError::new(format!(
                "Failed to create {}: {}",
                self.dir.display(),
                e
            )))
        })?;

        let json = serde_json::to_string_pretty(credential).map_err(|e| {
            ExmbError::from(ConfigError::new(format!(
                "Failed to serialize credential: {}",
                e
            )))
        })?;
        let path = self.path_for(alias);
        std::fs::write(&path, json).map_err(|e| {
            ExmbError::from(ConfigError::new(format!(
                "Failed to write {}: {}",
                path.display(),
                e
            )))
        })?;

        debug!(path = %path.display(), "Saved credential");
        Ok(())
    }

    /// Delete `alias`. Returns false when it did not exist.
    #[instrument(skip(self))]
    pub fn remove(&self, alias: &str) -> ExmbResult<bool> {
        validate_alias(alias)?;
        let path = self.path_for(alias);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ConfigError::new(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))
            .into()),
        }
    }
}

fn validate_alias(alias: &str) -> ExmbResult<()> {
    let valid = !alias.is_empty()
        && alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::new(format!(
            "Invalid alias '{}': use letters, digits, '-' or '_'",
            alias
        ))
        .into())
    }
}

//! Layered bot configuration.
//!
//! Values are merged from, lowest precedence first:
//!
//! 1. the bundled `exmb.toml`
//! 2. `~/.config/exmb/exmb.toml`
//! 3. `./exmb.toml`
//! 4. an explicit `--config` file, when given
//! 5. `EXMB_*` environment variables (`EXMB_BOT__LIMIT=50`)
//!
//! Command-line flags are applied on top by the binary.

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use exmb_core::MirrorTarget;
use exmb_error::{ConfigError, ExmbError, ExmbResult};
use exmb_hosts::{
    STREAMABLE, STREAMABLE_MAX_SIZE_MB, STREAMFF, STREAMFF_MAX_SIZE_MB, STREAMJA,
    STREAMJA_MAX_SIZE_MB,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled defaults.
const DEFAULT_CONFIG: &str = include_str!("../exmb.toml");

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExmbConfig {
    /// User agent for Reddit and host requests.
    pub user_agent: String,
    /// Polling and discovery settings.
    #[serde(default)]
    pub bot: BotSettings,
    /// Mirror destinations, in comment order.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    /// Comment footer settings.
    #[serde(default)]
    pub comment: CommentSettings,
    /// Optional Streamable account for imports.
    #[serde(default)]
    pub streamable: StreamableSettings,
}

/// Polling and discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotSettings {
    /// Subreddit to watch; usually given on the command line.
    #[serde(default)]
    pub subreddit: Option<String>,
    /// Listing page size.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Seconds to sleep between cycles.
    #[serde(default = "default_sleep_interval_secs")]
    pub sleep_interval_secs: u64,
    /// Processing checks before a post is given up on.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Seconds between processing checks; hosts decide when unset.
    #[serde(default)]
    pub retry_delay_secs: Option<u64>,
    /// Only mirror posts carrying a pinned moderation-bot comment.
    #[serde(default)]
    pub strict_moderator_filter: bool,
    /// Moderation bot account name.
    #[serde(default = "default_moderator_account")]
    pub moderator_account: String,
    /// Bound on the cursor rollback stack.
    #[serde(default)]
    pub cursor_stack_capacity: Option<usize>,
    /// JSON file recording posts already commented on.
    #[serde(default)]
    pub ledger_path: Option<PathBuf>,
}

fn default_limit() -> u32 {
    100
}

fn default_sleep_interval_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    5
}

fn default_moderator_account() -> String {
    "AutoModerator".to_string()
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            subreddit: None,
            limit: default_limit(),
            sleep_interval_secs: default_sleep_interval_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: None,
            strict_moderator_filter: false,
            moderator_account: default_moderator_account(),
            cursor_stack_capacity: None,
            ledger_path: None,
        }
    }
}

impl BotSettings {
    /// Sleep between cycles.
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_interval_secs)
    }

    /// Configured processing-check delay, if any.
    pub fn retry_delay(&self) -> Option<Duration> {
        self.retry_delay_secs.map(Duration::from_secs)
    }
}

/// One mirror destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Host name (`streamable`, `streamja`, `streamff`).
    pub host: String,
    /// Size ceiling in megabytes; the host's own limit when unset.
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl TargetConfig {
    /// Target using the host's default ceiling.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            max_size_mb: None,
        }
    }

    /// Resolve into a [`MirrorTarget`], rejecting unknown hosts.
    pub fn to_target(&self) -> ExmbResult<MirrorTarget> {
        let default_mb = default_max_size_mb(&self.host).ok_or_else(|| {
            ExmbError::from(ConfigError::new(format!(
                "Unknown mirror host '{}'",
                self.host
            )))
        })?;
        Ok(MirrorTarget::from_megabytes(
            self.host.as_str(),
            self.max_size_mb.unwrap_or(default_mb),
        ))
    }
}

/// Upload ceiling of a known mirror host.
pub fn default_max_size_mb(host: &str) -> Option<u64> {
    match host {
        STREAMABLE => Some(STREAMABLE_MAX_SIZE_MB),
        STREAMJA => Some(STREAMJA_MAX_SIZE_MB),
        STREAMFF => Some(STREAMFF_MAX_SIZE_MB),
        _ => None,
    }
}

/// Comment footer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSettings {
    /// Name in the attribution footer.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    /// Project link in the footer.
    #[serde(default = "default_project_link")]
    pub project_link: String,
    /// Account that receives mirror issue reports.
    #[serde(default = "default_contact_user")]
    pub contact_user: String,
}

fn default_bot_name() -> String {
    "exmb".to_string()
}

fn default_project_link() -> String {
    "https://github.com/eXhumer/exmb".to_string()
}

fn default_contact_user() -> String {
    "ContentPuff".to_string()
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            project_link: default_project_link(),
            contact_user: default_contact_user(),
        }
    }
}

/// Streamable account used for imports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamableSettings {
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Account password.
    #[serde(default)]
    pub password: Option<String>,
}

impl ExmbConfig {
    /// Load from every layer, adding `explicit` above the working directory file.
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> ExmbResult<Self> {
        debug!("Loading configuration with precedence: env > explicit > current dir > home dir > bundled defaults");

        let mut builder = Self::defaults();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/exmb/exmb.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("exmb").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix("EXMB").separator("__"));

        Self::finish(builder)
    }

    /// Bundled defaults overlaid with a single file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ExmbResult<Self> {
        debug!("Loading configuration from file");
        Self::finish(Self::defaults().add_source(File::from(path.as_ref())))
    }

    /// Parse the bundled defaults alone.
    pub fn bundled() -> ExmbResult<Self> {
        Self::finish(Self::defaults())
    }

    fn defaults() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> ExmbResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| {
                ExmbError::from(ConfigError::new(format!(
                    "Failed to load configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ExmbError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        debug!(
            targets = config.targets.len(),
            limit = config.bot.limit,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Resolve every configured target, failing on the first unknown host.
    pub fn mirror_targets(&self) -> ExmbResult<Vec<MirrorTarget>> {
        self.targets.iter().map(TargetConfig::to_target).collect()
    }
}

/// Command-line values laid over a loaded [`ExmbConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotOverrides {
    /// Subreddit to watch.
    pub subreddit: Option<String>,
    /// Listing page size.
    pub limit: Option<u32>,
    /// Seconds between cycles.
    pub sleep_interval_secs: Option<u64>,
    /// Turn the moderator filter on.
    pub strict_moderator_filter: bool,
    /// Replace the configured targets when non-empty.
    pub targets: Vec<String>,
}

impl BotOverrides {
    /// Apply every set value to `config`.
    pub fn apply(self, config: &mut ExmbConfig) {
        if let Some(subreddit) = self.subreddit {
            config.bot.subreddit = Some(subreddit);
        }
        if let Some(limit) = self.limit {
            config.bot.limit = limit;
        }
        if let Some(secs) = self.sleep_interval_secs {
            config.bot.sleep_interval_secs = secs;
        }
        if self.strict_moderator_filter {
            config.bot.strict_moderator_filter = true;
        }
        if !self.targets.is_empty() {
            config.targets = self.targets.into_iter().map(TargetConfig::new).collect();
        }
    }
}

//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// exmb - mirror subreddit clip posts to alternate video hosts
#[derive(Parser, Debug)]
#[command(name = "exmb")]
#[command(about = "Mirror subreddit clip posts to alternate video hosts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Extra configuration file, layered above ./exmb.toml
    #[arg(long, global = true, env = "EXMB_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stored credentials
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Watch a subreddit and mirror new clip posts until interrupted
    RunBot {
        /// Credential alias
        alias: String,

        /// Subreddit to watch
        subreddit: String,

        /// Resume after this post full name instead of the newest post
        #[arg(long)]
        before: Option<String>,

        /// Listing page size
        #[arg(long)]
        limit: Option<u32>,

        /// Seconds to sleep between cycles
        #[arg(long)]
        sleep_interval: Option<u64>,

        /// Only mirror posts with a pinned moderation-bot comment
        #[arg(long)]
        strict_moderator_filter: bool,

        /// Mirror host; repeat to mirror to several
        #[arg(long = "target")]
        targets: Vec<String>,
    },

    /// Mirror specific posts once and exit
    MirrorPosts {
        /// Credential alias
        alias: String,

        /// Post ids or full names
        #[arg(required = true)]
        post_ids: Vec<String>,

        /// Mirror host; repeat to mirror to several
        #[arg(long = "target")]
        targets: Vec<String>,

        /// Only mirror posts with a pinned moderation-bot comment
        #[arg(long)]
        strict_moderator_filter: bool,
    },

    /// Upload a local clip and submit it as a link post
    Post {
        /// Credential alias
        alias: String,

        /// Upload host (streamja, streamff)
        host: String,

        /// Post title
        title: String,

        /// Local video file
        media_path: PathBuf,

        /// Subreddit to post in
        #[arg(long)]
        subreddit: String,
    },
}

/// Credential subcommands
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// List stored aliases
    List,

    /// Store a Reddit access token under an alias
    Add {
        /// Alias name
        alias: String,

        /// Reddit OAuth access token
        #[arg(long, env = "EXMB_REDDIT_ACCESS_TOKEN")]
        access_token: String,

        /// Discord bot token for status messages
        #[arg(long, requires = "discord_owner")]
        discord_token: Option<String>,

        /// Discord user id receiving status messages
        #[arg(long, requires = "discord_token")]
        discord_owner: Option<u64>,
    },

    /// Delete a stored alias
    Remove {
        /// Alias name
        alias: String,
    },
}

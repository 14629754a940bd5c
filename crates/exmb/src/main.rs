//! exmb CLI binary.
//!
//! - Manage stored Reddit credentials
//! - Run the mirror bot against a subreddit
//! - Mirror specific posts once
//! - Upload a local clip and submit it

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, handle_auth_command, mirror_posts, post_media, run_bot};

    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    exmb::init_tracing(cli.verbose, cli.json_logs)?;

    match cli.command {
        Commands::Auth(auth_cmd) => {
            handle_auth_command(auth_cmd)?;
        }

        Commands::RunBot {
            alias,
            subreddit,
            before,
            limit,
            sleep_interval,
            strict_moderator_filter,
            targets,
        } => {
            let config = exmb::ExmbConfig::load(cli.config.as_deref())?;
            let overrides = exmb::BotOverrides {
                subreddit: Some(subreddit),
                limit,
                sleep_interval_secs: sleep_interval,
                strict_moderator_filter,
                targets,
            };
            run_bot(config, &alias, before, overrides).await?;
        }

        Commands::MirrorPosts {
            alias,
            post_ids,
            targets,
            strict_moderator_filter,
        } => {
            let config = exmb::ExmbConfig::load(cli.config.as_deref())?;
            let overrides = exmb::BotOverrides {
                strict_moderator_filter,
                targets,
                ..Default::default()
            };
            mirror_posts(config, &alias, &post_ids, overrides).await?;
        }

        Commands::Post {
            alias,
            host,
            title,
            media_path,
            subreddit,
        } => {
            let config = exmb::ExmbConfig::load(cli.config.as_deref())?;
            post_media(config, &alias, &host, &title, &media_path, &subreddit).await?;
        }
    }

    Ok(())
}

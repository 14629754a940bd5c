//! Bot command handlers.

use exmb::{
    BotOverrides, ConfigError, CredentialStore, DEFAULT_FILENAME, ExmbConfig, ExmbError,
    ExmbResult, FeedSource, MediaBlob, MirrorHost, StorageError, StorageErrorKind,
    UploadMetadataBuilder, build_bot, post_full_name, reddit_client, upload_host,
};
use exmb_hosts::build_client;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Run the bot against `subreddit` until ctrl-c.
#[instrument(skip(config, overrides))]
pub async fn run_bot(
    mut config: ExmbConfig,
    alias: &str,
    before: Option<String>,
    overrides: BotOverrides,
) -> ExmbResult<()> {
    overrides.apply(&mut config);
    let credential = CredentialStore::default_location()?.load(alias)?;
    let subreddit = config
        .bot
        .subreddit
        .clone()
        .ok_or_else(|| ExmbError::from(ConfigError::new("No subreddit configured")))?;

    let mut bot = build_bot(&config, &credential, &subreddit, before).await?;
    info!(subreddit = %subreddit, "Starting bot");

    bot.run(shutdown_signal()).await;
    Ok(())
}

/// Mirror `post_ids` once and print the outcome.
#[instrument(skip(config, overrides))]
pub async fn mirror_posts(
    mut config: ExmbConfig,
    alias: &str,
    post_ids: &[String],
    overrides: BotOverrides,
) -> ExmbResult<()> {
    overrides.apply(&mut config);
    let credential = CredentialStore::default_location()?.load(alias)?;
    let subreddit = config.bot.subreddit.clone().unwrap_or_default();

    let full_names: Vec<String> = post_ids.iter().map(|id| post_full_name(id)).collect();
    let mut bot = build_bot(&config, &credential, &subreddit, None).await?;
    let (mirrored, not_found) = bot.mirror_posts(&full_names).await?;

    println!("Mirrored: {}", mirrored.join(", "));
    println!("Not found: {}", not_found.join(", "));
    Ok(())
}

/// Upload `media_path` to `host` and submit the mirror as a link post.
#[instrument(skip(config))]
pub async fn post_media(
    config: ExmbConfig,
    alias: &str,
    host: &str,
    title: &str,
    media_path: &Path,
    subreddit: &str,
) -> ExmbResult<()> {
    let credential = CredentialStore::default_location()?.load(alias)?;
    let client = build_client(&config.user_agent)?;
    let mirror = upload_host(&client, host)?;

    let data = tokio::fs::read(media_path).await.map_err(|e| {
        ExmbError::from(StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            media_path.display(),
            e
        ))))
    })?;
    let filename = media_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    let blob = MediaBlob::new(data, filename);

    let metadata = UploadMetadataBuilder::default()
        .title(title)
        .source_url(media_path.display().to_string())
        .build()
        .map_err(|e| ExmbError::from(ConfigError::new(format!("Invalid upload metadata: {}", e))))?;

    let status = mirror.upload(&blob, &metadata).await?;
    let Some(url) = status.url() else {
        return Err(ConfigError::new(format!("Upload to {} failed: {}", host, status)).into());
    };
    info!(url, "Uploaded clip");

    let feed = reddit_client(&config, &credential)?;
    let full_name = feed.submit_link(subreddit, title, url).await?;
    println!("Submitted {} -> {}", full_name, url);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
}

//! Builds the engine from configuration and credentials.

use crate::config::ExmbConfig;
use crate::credentials::Credential;
use crate::notify::LogNotifier;
use exmb_engine::{
    CommentComposer, ComposerConfigBuilder, DiscoveryConfigBuilder, DiscoveryCursor,
    HostRegistry, JsonCommentLedger, MirrorAggregator, MirrorBot, Orchestrator,
};
use exmb_error::{ConfigError, ExmbError, ExmbResult};
use exmb_hosts::{
    HttpMediaFetcher, ImgurHost, STREAMABLE, STREAMFF, STREAMJA, StreamableCredentials,
    StreamableHost, StreamffHost, StreamjaHost, build_client,
};
use exmb_interface::{Clock, FeedSource, MirrorHost, Notifier, SystemClock};
use exmb_reddit::{RedditClient, RedditConfigBuilder};
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, instrument};

/// Streamable account from config, when both fields are present.
pub fn streamable_credentials(config: &ExmbConfig) -> Option<StreamableCredentials> {
    match (&config.streamable.email, &config.streamable.password) {
        (Some(email), Some(password)) => Some(StreamableCredentials {
            email: email.clone(),
            password: password.clone(),
        }),
        _ => None,
    }
}

/// Every supported source host plus the mirror hosts named by `config.targets`.
#[instrument(skip_all)]
pub fn host_registry(config: &ExmbConfig, client: &Client) -> ExmbResult<HostRegistry> {
    let streamable = Arc::new(
        StreamableHost::new(client.clone()).with_credentials(streamable_credentials(config)),
    );
    let streamja = Arc::new(StreamjaHost::new(client.clone()));
    let streamff = Arc::new(StreamffHost::new(client.clone()));

    let mut registry = HostRegistry::new()
        .with_source(streamable.clone())
        .with_source(streamja.clone())
        .with_source(streamff.clone())
        .with_source(Arc::new(ImgurHost::new(client.clone())));

    for target in config.mirror_targets()? {
        let mirror: Arc<dyn MirrorHost> = match target.host().as_str() {
            STREAMABLE => streamable.clone(),
            STREAMJA => streamja.clone(),
            STREAMFF => streamff.clone(),
            other => {
                return Err(ConfigError::new(format!("Unknown mirror host '{}'", other)).into());
            }
        };
        registry = registry.with_mirror(mirror);
    }

    info!(
        sources = ?registry.source_ids(),
        mirrors = ?registry.mirror_ids(),
        "Registered hosts"
    );
    Ok(registry)
}

/// Reddit client for `credential`.
pub fn reddit_client(config: &ExmbConfig, credential: &Credential) -> ExmbResult<RedditClient> {
    let reddit_config = RedditConfigBuilder::default()
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| {
            ExmbError::from(ConfigError::new(format!(
                "Invalid Reddit configuration: {}",
                e
            )))
        })?;
    Ok(RedditClient::new(
        credential.reddit.access_token.clone(),
        reddit_config,
    )?)
}

/// Discord DM notifier when the alias carries a Discord bot, else the log.
pub fn notifier(credential: &Credential) -> ExmbResult<Arc<dyn Notifier>> {
    #[cfg(feature = "discord")]
    if let Some(discord) = &credential.discord {
        let notifier =
            crate::notify::DiscordNotifier::new(&discord.bot_token, discord.owner_id)?;
        return Ok(Arc::new(notifier));
    }

    #[cfg(not(feature = "discord"))]
    if credential.discord.is_some() {
        tracing::warn!("Discord credentials present but the discord feature is disabled");
    }

    Ok(Arc::new(LogNotifier))
}

/// Wire a [`MirrorBot`] watching `channel`, resuming after `before` when given.
#[instrument(skip(config, credential))]
pub async fn build_bot(
    config: &ExmbConfig,
    credential: &Credential,
    channel: &str,
    before: Option<String>,
) -> ExmbResult<MirrorBot> {
    let client = build_client(&config.user_agent)?;
    let registry = Arc::new(host_registry(config, &client)?);
    let feed: Arc<dyn FeedSource> = Arc::new(reddit_client(config, credential)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let settings = &config.bot;

    let discovery_config = DiscoveryConfigBuilder::default()
        .channel(channel)
        .limit(settings.limit)
        .strict_moderator_filter(settings.strict_moderator_filter)
        .moderator_account(settings.moderator_account.clone())
        .cursor_stack_capacity(settings.cursor_stack_capacity)
        .build()
        .map_err(|e| {
            ExmbError::from(ConfigError::new(format!(
                "Invalid discovery configuration: {}",
                e
            )))
        })?;
    let discovery =
        DiscoveryCursor::new(feed.clone(), registry.clone(), discovery_config).with_cursor(before);

    let mut orchestrator =
        Orchestrator::new(registry.clone(), clock.clone()).with_max_attempts(settings.max_attempts);
    if let Some(delay) = settings.retry_delay() {
        orchestrator = orchestrator.with_retry_delay(delay);
    }

    let aggregator = MirrorAggregator::new(registry, config.mirror_targets()?);

    let composer_config = ComposerConfigBuilder::default()
        .bot_name(config.comment.bot_name.clone())
        .project_link(config.comment.project_link.clone())
        .contact_user(config.comment.contact_user.clone())
        .moderator_account(settings.moderator_account.clone())
        .build()
        .map_err(|e| {
            ExmbError::from(ConfigError::new(format!(
                "Invalid comment configuration: {}",
                e
            )))
        })?;
    let mut composer = CommentComposer::new(feed, composer_config);
    if let Some(path) = &settings.ledger_path {
        let ledger = JsonCommentLedger::open(path.clone()).await?;
        composer = composer.with_ledger(Arc::new(ledger));
    }

    Ok(MirrorBot::new(
        discovery,
        orchestrator,
        aggregator,
        composer,
        Arc::new(HttpMediaFetcher::new(client)),
        notifier(credential)?,
        clock,
    )
    .with_interval(settings.sleep_interval()))
}

/// Mirror host named `host` for one-off uploads of local files.
pub fn upload_host(client: &Client, host: &str) -> ExmbResult<Arc<dyn MirrorHost>> {
    match host {
        STREAMABLE => Err(ConfigError::new(
            "Streamable mirrors by URL import and cannot upload local files",
        )
        .into()),
        STREAMJA => Ok(Arc::new(StreamjaHost::new(client.clone()))),
        STREAMFF => Ok(Arc::new(StreamffHost::new(client.clone()))),
        other => Err(ConfigError::new(format!("Unknown mirror host '{}'", other)).into()),
    }
}

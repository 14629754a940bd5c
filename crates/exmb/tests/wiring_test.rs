//! Tests for assembling the engine from configuration.

use exmb::{
    Credential, ExmbConfig, ExmbErrorKind, HostId, MirrorHost, TargetConfig, build_bot, host_registry,
    notifier, reddit_client, streamable_credentials, upload_host,
};

fn client() -> reqwest::Client {
    exmb_hosts::build_client("exmb-test").expect("client builds")
}

fn ids(names: &[&str]) -> Vec<HostId> {
    names.iter().map(|name| HostId::from(*name)).collect()
}

#[test]
fn test_registry_has_all_sources_and_configured_mirrors() {
    let config = ExmbConfig::bundled().expect("bundled config parses");

    let registry = host_registry(&config, &client()).expect("registry");

    assert_eq!(
        registry.source_ids(),
        ids(&["streamable", "streamja", "streamff", "imgur"])
    );
    assert_eq!(registry.mirror_ids(), ids(&["streamable", "streamja"]));
    assert!(registry.supports("https://streamable.com/abc123"));
    assert!(!registry.supports("https://youtube.com/watch?v=abc"));
}

#[test]
fn test_registry_rejects_unknown_target() {
    let mut config = ExmbConfig::bundled().expect("bundled config parses");
    config.targets = vec![TargetConfig::new("dropbox")];

    let err = host_registry(&config, &client()).expect_err("unknown host");

    assert!(matches!(err.kind(), ExmbErrorKind::Config(_)));
}

#[test]
fn test_streamable_credentials_need_both_fields() {
    let mut config = ExmbConfig::bundled().expect("bundled config parses");
    assert!(streamable_credentials(&config).is_none());

    config.streamable.email = Some("bot@example.com".to_string());
    assert!(streamable_credentials(&config).is_none());

    config.streamable.password = Some("hunter2".to_string());
    let credentials = streamable_credentials(&config).expect("both set");
    assert_eq!(credentials.email, "bot@example.com");
}

#[test]
fn test_upload_host_selection() {
    let client = client();

    assert_eq!(
        upload_host(&client, "streamja").expect("streamja uploads").id(),
        HostId::from("streamja")
    );
    assert_eq!(
        upload_host(&client, "streamff").expect("streamff uploads").id(),
        HostId::from("streamff")
    );
    assert!(upload_host(&client, "streamable").is_err());
    assert!(upload_host(&client, "imgur").is_err());
}

#[test]
fn test_reddit_client_uses_configured_user_agent() {
    let mut config = ExmbConfig::bundled().expect("bundled config parses");
    config.user_agent = "exmb-test-agent".to_string();

    let client = reddit_client(&config, &Credential::new("token")).expect("client");

    assert_eq!(client.config().user_agent(), "exmb-test-agent");
}

#[test]
fn test_log_notifier_without_discord() {
    assert!(notifier(&Credential::new("token")).is_ok());
}

#[tokio::test]
async fn test_build_bot_applies_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = ExmbConfig::bundled().expect("bundled config parses");
    config.bot.limit = 10;
    config.bot.strict_moderator_filter = true;
    config.bot.ledger_path = Some(dir.path().join("ledger.json"));
    config.comment.bot_name = "mirrorbot".to_string();

    let bot = build_bot(
        &config,
        &Credential::new("token"),
        "formula1",
        Some("t3_start".to_string()),
    )
    .await
    .expect("bot builds");

    assert_eq!(bot.discovery().cursor(), Some("t3_start"));
    assert_eq!(bot.discovery().config().channel(), "formula1");
    assert_eq!(*bot.discovery().config().limit(), 10);
    assert!(*bot.discovery().config().strict_moderator_filter());
    assert_eq!(bot.orchestrator().max_attempts(), 5);
    assert_eq!(bot.composer().config().bot_name(), "mirrorbot");
    assert_eq!(bot.pending_comments(), 0);
}

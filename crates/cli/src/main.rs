mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tweeterbot_core::{load_config, metrics, validate_config, Bot, SanitizedConfig};

use cli::Cli;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config_path = cli.config_path();
    info!("tweeterbot {} loading configuration from {:?}", VERSION, config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    if cli.show_config {
        let sanitized = SanitizedConfig::from(&config);
        let rendered = serde_json::to_string_pretty(&sanitized)
            .context("Failed to render configuration")?;
        println!("{}", rendered);
        return Ok(());
    }

    validate_config(&config).context("Configuration validation failed")?;

    if !cli.has_workflow() {
        bail!("Nothing to do; pass a workflow flag such as --sync (see --help)");
    }

    let mut bot = Bot::from_config(config).context("Failed to initialize bot")?;
    let result = run_workflows(&cli, &mut bot).await;

    if let Some(path) = &cli.metrics_out {
        write_metrics(path)?;
    }

    result
}

fn init_logging(cli: &Cli) {
    let filter = match cli.loglevel.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_workflows(cli: &Cli, bot: &mut Bot) -> Result<()> {
    if cli.sync {
        let report = bot.sync_follows().await.context("Sync failed")?;
        info!(
            "Synced {} followers, {} following",
            report.followers, report.following
        );
    }

    if cli.follow_back {
        let report = bot.follow_back().await.context("Follow back failed")?;
        info!("Follow back: {}", report);
    }

    if cli.unfollow {
        let report = bot
            .unfollow_non_followers()
            .await
            .context("Unfollow failed")?;
        info!("Unfollow: {}", report);
    }

    if let Some(phrase) = &cli.follow_by_phrase {
        let report = bot
            .follow_by_phrase(phrase)
            .await
            .with_context(|| format!("Follow by phrase {:?} failed", phrase))?;
        info!("Follow by phrase: {}", report);
    }

    if let Some(phrase) = &cli.fav_by_phrase {
        let report = bot
            .favorite_by_phrase(phrase)
            .await
            .with_context(|| format!("Favorite by phrase {:?} failed", phrase))?;
        info!("Favorite by phrase: {}", report);
    }

    if let Some(phrase) = &cli.rt_by_phrase {
        let report = bot
            .retweet_by_phrase(phrase)
            .await
            .with_context(|| format!("Retweet by phrase {:?} failed", phrase))?;
        info!("Retweet by phrase: {}", report);
    }

    if let Some(handle) = &cli.follow_followers_of {
        let report = bot
            .follow_followers_of(handle)
            .await
            .with_context(|| format!("Following followers of {} failed", handle))?;
        info!("Follow followers of {}: {}", handle, report);
    }

    if cli.non_followers {
        let report = bot
            .report_non_followers()
            .await
            .context("Non-followers report failed")?;
        info!(
            "{} of {} non-followers written to {:?}",
            report.listed, report.total, report.path
        );
    }

    if cli.unfollow_report {
        let report = bot
            .unfollow_from_report()
            .await
            .context("Unfollow from report failed")?;
        info!("Unfollow from report: {}", report);
    }

    if !cli.unfollow_ids.is_empty() {
        let report = bot
            .unfollow_listed(&cli.unfollow_ids)
            .await
            .context("Unfollowing listed ids failed")?;
        info!("Unfollow listed: {}", report);
    }

    if cli.mute_following {
        let report = bot.mute_following().await.context("Mute following failed")?;
        info!("Mute following: {}", report);
    }

    if cli.unmute_all {
        let report = bot.unmute_all().await.context("Unmute failed")?;
        info!("Unmute: {}", report);
    }

    if let (Some(phrase), Some(slug)) = (&cli.add_to_list, &cli.list_slug) {
        let report = bot
            .add_to_list_by_phrase(phrase, slug)
            .await
            .with_context(|| format!("Adding authors of {:?} to list {} failed", phrase, slug))?;
        info!("Add to list {}: {}", slug, report);
    }

    if let Some(text) = &cli.post {
        let report = bot
            .post_status(text, cli.image.as_deref())
            .await
            .context("Posting failed")?;
        info!("Post: {}", report);
    }

    if let Some(id) = cli.unretweet {
        let report = bot.unretweet(id).await.context("Unretweet failed")?;
        info!("Unretweet: {}", report);
    }

    if let (Some(archive), Some(before)) = (&cli.delete_archived, &cli.before) {
        let report = bot
            .delete_archived(archive, before)
            .await
            .with_context(|| format!("Deleting posts from {:?} failed", archive))?;
        info!("Delete archived: {}", report);
    }

    Ok(())
}

fn write_metrics(path: &Path) -> Result<()> {
    let text = metrics::encode_metrics().context("Failed to encode metrics")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write metrics to {:?}", path))?;
    info!("Metrics written to {:?}", path);
    Ok(())
}

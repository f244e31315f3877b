//! `zlog` command-line front end.
//!
//! # Responsibility
//! - Wire configuration, logging, stores and the sync client together.
//! - Flush pending saves before the process exits.

use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;
use zlog_core::config::ENV_DATA_DIR;
use zlog_core::model::samples::sample_sleeps;
use zlog_core::{
    init_from_config, AppConfig, DreamSource, FileDocumentStore, JournalStats, LoadOutcome,
    RemoteSyncClient, SleepStore, TagStore,
};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "zlog", version)]
#[command(about = "Sleep and dream journal")]
struct Cli {
    /// Journal directory (defaults to the per-user data directory).
    #[arg(long, global = true, env = "ZLOG_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Base URL of the shared dreams service.
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Totals and most used tags.
    Stats,
    /// Show a random dream from the journal or the dreams service.
    Random {
        #[arg(long)]
        remote: bool,
    },
    /// Upload one of your dreams and mark it as shared.
    Share { dream_id: Uuid },
    /// Record a new sleep starting now.
    AddSleep {
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Fill an empty journal with sample sleeps.
    Seed,
    /// List tags.
    Tags,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::Random { .. } => "random",
            Self::Share { .. } => "share",
            Self::AddSleep { .. } => "add-sleep",
            Self::Seed => "seed",
            Self::Tags => "tags",
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let data_dir = cli.data_dir.map(|dir| dir.to_string_lossy().into_owned());
    let mut config = AppConfig::from_lookup(|key| match (key, &data_dir) {
        (ENV_DATA_DIR, Some(dir)) => Some(dir.clone()),
        _ => std::env::var(key).ok(),
    })?;
    if let Some(url) = cli.server.as_deref() {
        config = config.with_remote_base_url(url)?;
    }
    if let Err(err) = init_from_config(&config) {
        eprintln!("warning: file logging disabled: {err}");
    }

    info!(
        "event=cli_command module=cli status=start command={} data_dir={}",
        cli.command.name(),
        config.data_dir.display()
    );
    match cli.command {
        Command::Stats => stats(&config).await,
        Command::Random { remote } => random(&config, remote).await,
        Command::Share { dream_id } => share(&config, dream_id).await,
        Command::AddSleep { notes } => add_sleep(&config, notes).await,
        Command::Seed => seed(&config).await,
        Command::Tags => tags(&config).await,
    }
}

async fn open_sleeps(config: &AppConfig) -> CliResult<SleepStore> {
    let document = Arc::new(FileDocumentStore::new(config.sleeps_path()));
    let mut store = SleepStore::new(document)?;
    report_load("sleeps", store.load_or_fallback().await);
    Ok(store)
}

/// Strict load for commands that write: an unreadable journal must not be
/// replaced by a fresh one.
async fn open_sleeps_for_write(config: &AppConfig) -> CliResult<SleepStore> {
    let document = Arc::new(FileDocumentStore::new(config.sleeps_path()));
    let mut store = SleepStore::new(document)?;
    store.load().await?;
    Ok(store)
}

async fn open_tags(config: &AppConfig) -> CliResult<TagStore> {
    let document = Arc::new(FileDocumentStore::new(config.tags_path()));
    let mut store = TagStore::new(document)?;
    report_load("tags", store.load_or_fallback().await);
    Ok(store)
}

fn report_load(collection: &str, outcome: LoadOutcome) {
    if let LoadOutcome::FellBack { reason, .. } = outcome {
        eprintln!("warning: could not read {collection}: {reason}");
    }
}

async fn stats(config: &AppConfig) -> CliResult<()> {
    let store = open_sleeps(config).await?;
    let stats = JournalStats::compute(store.sleeps());
    // Loading may have re-saved a legacy document.
    store.flush().await?;
    println!("sleeps: {}", stats.total_sleeps);
    println!("dreams: {}", stats.total_dreams);
    for (tag, count) in stats.top_tags {
        println!("  #{} x{count}", tag.name);
    }
    Ok(())
}

async fn random(config: &AppConfig, remote: bool) -> CliResult<()> {
    let dream = if remote {
        RemoteSyncClient::from_config(config)?
            .fetch_random_dream()
            .await?
    } else {
        let store = open_sleeps(config).await?;
        let dream = store.random_dream();
        store.flush().await?;
        dream
    };

    match dream {
        Some(dream) => {
            println!("{} [{}]", dream.title, dream.rating.label());
            println!("{}", dream.description);
            println!("id: {}", dream.id);
        }
        None => println!("no dreams yet"),
    }
    Ok(())
}

async fn share(config: &AppConfig, dream_id: Uuid) -> CliResult<()> {
    let mut store = open_sleeps_for_write(config).await?;
    let dream = store
        .all_dreams()
        .find(|dream| dream.id == dream_id)
        .cloned()
        .ok_or_else(|| format!("no dream with id {dream_id} in the journal"))?;

    let client = RemoteSyncClient::from_config(config)?;
    let updated = client
        .share_and_reconcile(&dream, DreamSource::Local, &mut store)
        .await?;
    store.flush().await?;
    println!("shared {dream_id}; {updated} journal entries marked as uploaded");
    Ok(())
}

async fn add_sleep(config: &AppConfig, notes: String) -> CliResult<()> {
    let mut store = open_sleeps_for_write(config).await?;
    let sleep_id = store.add_sleep(config.default_time_zone);
    if !notes.is_empty() {
        let index = store.len() - 1;
        store.edit_sleep(index, |sleep| sleep.notes = notes)?;
    }
    store.flush().await?;
    if let Some(sleep) = store.find(sleep_id) {
        println!("{} {}", sleep.id, sleep.short_label());
    }
    Ok(())
}

async fn seed(config: &AppConfig) -> CliResult<()> {
    let mut store = open_sleeps_for_write(config).await?;
    if !store.is_empty() {
        println!("journal already has {} sleeps; nothing to seed", store.len());
        return Ok(());
    }
    for sleep in sample_sleeps(chrono::Utc::now(), config.default_time_zone) {
        store.append(sleep);
    }
    store.flush().await?;
    println!("seeded {} sample sleeps", store.len());
    Ok(())
}

async fn tags(config: &AppConfig) -> CliResult<()> {
    let store = open_tags(config).await?;
    for tag in store.tags() {
        println!("#{:<12} {} {}", tag.name, tag.color, tag.details);
    }
    if store.is_sample_set() {
        println!("(built-in sample tags)");
    }
    store.flush().await?;
    Ok(())
}

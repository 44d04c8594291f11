//! url-cli — command-line front end for the URL action log.
//!
//! Runs the same actions as the api-server directly against the SQLite log
//! and the remote shortener, printing JSON on stdout. Logs go to stderr.
//!
//! ```bash
//! url-cli create promo -l https://example.com/landing
//! url-cli update promo -l https://example.com/new-landing
//! url-cli current
//! url-cli qr-range aws3.link/llqrv 100 48
//! ```

use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use domain::qr::{self, LinkSettings, DEFAULT_QR_PROVIDER, DEFAULT_QR_SIZE, DEFAULT_SHORT_DOMAIN};
use domain::service::ActionService;
use domain::{ActionResult, ActionStore, Clock, CoreError, Owner, Shortener, Slug};
use http_common::{ActionOut, QrOut, StickerOut, UpdateOut};
use serde_json::{json, Value};
use shortener_client::{HttpShortener, DEFAULT_BASE_URL};
use sqlite_adapter::SqliteActionStore;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── CLI definition ─────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "url-cli", about = "Manage short links and their action log", version)]
struct Cli {
    /// SQLite action log
    #[arg(long, env = "DB_PATH", default_value = "./data/url_actions.db")]
    db_path: PathBuf,

    /// Owner the actions are recorded for
    #[arg(long, env = "API_USER", default_value = "api")]
    user: String,

    /// Key for the remote shortener; needed by create, update, delete and track
    #[arg(long, env = "SHORTENER_API_KEY", hide_env_values = true)]
    shortener_api_key: Option<String>,

    #[arg(long, env = "SHORTENER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    shortener_base_url: String,

    #[arg(long, env = "SHORT_DOMAIN", default_value = DEFAULT_SHORT_DOMAIN)]
    short_domain: String,

    #[arg(long, env = "QR_PROVIDER", default_value = DEFAULT_QR_PROVIDER)]
    qr_provider: String,

    #[arg(long, env = "QR_SIZE", default_value_t = DEFAULT_QR_SIZE)]
    qr_size: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Shorten a URL under a key
    Create {
        key: String,
        #[arg(short = 'l', long)]
        long_url: String,
    },
    /// Point an existing key at a new URL (remove, then shorten again)
    Update {
        key: String,
        #[arg(short = 'l', long)]
        long_url: String,
    },
    /// Remove a key from the shortener
    Delete { key: String },
    /// Raw hit data for a key
    Track { key: String },
    /// Keys that are live, with their latest action
    Current,
    /// Latest action per key and destination
    History,
    /// Logged actions, newest first, optionally for one key
    Log {
        key: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Short URL and QR image URL for a key
    Qr { key: String },
    /// QR image URLs for the numbered run <base><start> .. <base><start+count-1>
    QrRange {
        base: String,
        start: u64,
        count: u64,
        /// Image size in pixels, overriding QR_SIZE
        #[arg(long)]
        size: Option<u32>,
    },
}

impl Commands {
    fn needs_remote(&self) -> bool {
        matches!(
            self,
            Commands::Create { .. } | Commands::Update { .. } | Commands::Delete { .. } | Commands::Track { .. }
        )
    }
}

// ── Adapters ──────────────────────────────────────────────────────────────────

struct StdClock;
impl Clock for StdClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Remote client that only exists when a key was configured.
struct MaybeRemote(Option<HttpShortener>);

impl MaybeRemote {
    fn get(&self) -> Result<&HttpShortener, CoreError> {
        self.0
            .as_ref()
            .ok_or_else(|| CoreError::Transport("shortener is not configured".into()))
    }
}

impl Shortener for MaybeRemote {
    async fn shorten(&self, long_url: &str, key: Option<&Slug>) -> Result<ActionResult, CoreError> {
        self.get()?.shorten(long_url, key).await
    }

    async fn remove(&self, key: &Slug) -> Result<ActionResult, CoreError> {
        self.get()?.remove(key).await
    }

    async fn track(&self, key: &Slug) -> Result<Value, CoreError> {
        self.get()?.track(key).await
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let remote = if cli.command.needs_remote() {
        let key = cli
            .shortener_api_key
            .as_deref()
            .context("SHORTENER_API_KEY is required for this command")?;
        Some(HttpShortener::new(cli.shortener_base_url.clone(), key).context("configure shortener client")?)
    } else {
        None
    };

    let store = SqliteActionStore::open_creating_dirs(&cli.db_path)
        .with_context(|| format!("open action log at {}", cli.db_path.display()))?;
    let links = LinkSettings {
        short_domain: cli.short_domain.clone(),
        qr_provider: cli.qr_provider.clone(),
        qr_size: cli.qr_size,
    };
    let owner = Owner::new(cli.user.as_str()).context("--user must not be blank")?;
    let service = ActionService::with_links(store, MaybeRemote(remote), StdClock, links);

    let out = execute(&service, &owner, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

// ── Command implementations ───────────────────────────────────────────────────

async fn execute<S, C, K>(svc: &ActionService<S, C, K>, owner: &Owner, command: Commands) -> Result<Value>
where
    S: ActionStore,
    C: Shortener,
    K: Clock,
{
    let out = match command {
        Commands::Create { key, long_url } => {
            let action = svc.create_action(owner, &long_url, &key).await?;
            if !action.success() {
                warn!(key = %action.url_key, status = action.response_status, "shortener rejected create");
            }
            let mut v = serde_json::to_value(ActionOut::from(&action))?;
            v["short_url"] = json!(svc.links().short_url(&action.url_key));
            v
        }
        Commands::Update { key, long_url } => {
            let outcome = svc.update_action(owner, &key, &long_url).await?;
            if outcome.is_partial() {
                warn!(
                    key = %outcome.action.url_key,
                    delete_status = outcome.delete_step.response_status,
                    create_status = outcome.create_step.response_status,
                    "update only partially applied"
                );
            }
            serde_json::to_value(UpdateOut::from(&outcome))?
        }
        Commands::Delete { key } => {
            let action = svc.delete_action(owner, &key).await?;
            serde_json::to_value(ActionOut::from(&action))?
        }
        Commands::Track { key } => http_common::with_hit_count(svc.track_action(&key).await?),
        Commands::Current => serde_json::to_value(http_common::actions_out(&svc.list_current(owner)?))?,
        Commands::History => serde_json::to_value(http_common::actions_out(&svc.list_history(owner)?))?,
        Commands::Log { key: Some(key), limit } => {
            let mut actions = svc.get_key_history(owner, &key)?;
            if let Some(n) = limit {
                actions.truncate(n);
            }
            serde_json::to_value(http_common::actions_out(&actions))?
        }
        Commands::Log { key: None, limit } => {
            serde_json::to_value(http_common::actions_out(&svc.list_recent(owner, limit)?))?
        }
        Commands::Qr { key } => serde_json::to_value(QrOut::from(&svc.qr_url(&key)?))?,
        Commands::QrRange { base, start, count, size } => {
            if base.trim().is_empty() {
                bail!("qr-range needs a non-empty base");
            }
            let mut links = svc.links().clone();
            if let Some(size) = size {
                links.qr_size = size;
            }
            let stickers: Vec<StickerOut> =
                qr::qr_range(&links, &base, start, count).iter().map(StickerOut::from).collect();
            serde_json::to_value(stickers)?
        }
    };
    Ok(out)
}

//! # Beacon — notification assembly and scheduled delivery
//!
//! Usage:
//!   beacon display spec.json                  # Assemble and post now
//!   beacon schedule spec.json --in-secs 60    # Post later (persisted)
//!   beacon schedule spec.json --every 15      # Repeat every 15 minutes
//!   beacon pending                            # List scheduled notifications
//!   beacon cancel <id> | cancel-all           # Drop posted + scheduled
//!   beacon run                                # Work runner until Ctrl-C

use anyhow::{Context, Result};
use beacon_builder::BuildContext;
use beacon_core::BeaconConfig;
use beacon_core::traits::{KEY_NOTIFICATION, WorkKind, WorkScheduler};
use beacon_core::types::{NotificationSpec, ScheduleSpec};
use beacon_delivery::{Dispatcher, EventBus, MemorySurface, NotificationManager};
use beacon_scheduler::WorkQueue;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "beacon",
    version,
    about = "🔔 Beacon — rich notification assembly and scheduled delivery"
)]
struct Cli {
    /// Config file (default: ~/.beacon/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a notification from a JSON spec and post it
    Display {
        /// Path to the notification JSON
        spec: PathBuf,
    },
    /// Schedule a notification for later delivery
    Schedule {
        spec: PathBuf,
        /// Fire time, epoch milliseconds
        #[arg(long, conflicts_with = "in_secs")]
        at: Option<i64>,
        /// Fire this many seconds from now
        #[arg(long)]
        in_secs: Option<u64>,
        /// Repeat interval in minutes
        #[arg(long)]
        every: Option<i64>,
    },
    /// Cancel a notification and its pending schedule
    Cancel { id: String },
    /// Cancel every notification and pending schedule
    CancelAll,
    /// List pending scheduled notifications
    Pending,
    /// Run due scheduled work until interrupted
    Run,
}

fn expand_path(p: &str) -> String {
    shellexpand::tilde(p).to_string()
}

fn read_spec(path: &Path) -> Result<NotificationSpec> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

struct App {
    config: BeaconConfig,
    surface: Arc<MemorySurface>,
    queue: WorkQueue,
    manager: NotificationManager,
}

impl App {
    fn open(config: BeaconConfig) -> Result<Self> {
        let db_path = expand_path(&config.scheduler.db_path);
        let queue = WorkQueue::open(Path::new(&db_path))?;
        let surface = Arc::new(MemorySurface::new());
        let ctx = BuildContext::from_config(&config.assets, tokio::runtime::Handle::current())?;
        let dispatcher = Dispatcher::new(
            surface.clone(),
            surface.clone(),
            Arc::new(queue.clone()),
            EventBus::new(config.delivery.event_capacity),
        );
        let manager = NotificationManager::new(ctx, dispatcher);
        Ok(Self {
            config,
            surface,
            queue,
            manager,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "beacon=debug,beacon_builder=debug,beacon_delivery=debug,beacon_scheduler=debug,beacon_assets=debug"
    } else {
        "beacon=info,beacon_delivery=info,beacon_scheduler=info,beacon_assets=warn,beacon_builder=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => BeaconConfig::load_from(Path::new(&expand_path(path)))?,
        None => BeaconConfig::load()?,
    };
    let app = App::open(config)?;

    match cli.command {
        Command::Display { spec } => {
            let spec = read_spec(&spec)?;
            let tag = spec.tag();
            app.manager.display_notification(spec).await?;
            if let Some(posted) = app.surface.get(tag).await {
                println!("✅ Posted tag {tag}");
                if let Some(title) = &posted.title {
                    println!("   Title:   {}", title.as_str());
                }
                if let Some(body) = &posted.body {
                    println!("   Body:    {}", body.as_str());
                }
                println!("   Icon:    {}", if posted.large_icon.is_some() { "yes" } else { "no" });
                println!("   Actions: {}", posted.actions.len());
                println!("   Styled:  {}", if posted.style.is_some() { "yes" } else { "no" });
            }
        }
        Command::Schedule {
            spec,
            at,
            in_secs,
            every,
        } => {
            let spec = read_spec(&spec)?;
            let timestamp = match (at, in_secs) {
                (Some(at), _) => Some(at),
                (None, Some(secs)) => Some(
                    i64::try_from(secs)
                        .ok()
                        .and_then(|secs| secs.checked_mul(1000))
                        .and_then(|ms| chrono::Utc::now().timestamp_millis().checked_add(ms))
                        .context("--in-secs is too large")?,
                ),
                (None, None) => None,
            };
            let schedule = ScheduleSpec {
                timestamp,
                interval: every,
            };
            let id = spec.id.clone();
            app.manager.schedule_notification(spec, schedule).await?;
            println!("📅 Scheduled '{id}'");
        }
        Command::Cancel { id } => {
            app.manager.cancel_notification(&id).await?;
            println!("🗑️  Cancelled '{id}'");
        }
        Command::CancelAll => {
            app.manager.cancel_all_notifications().await?;
            println!("🗑️  Cancelled all notifications");
        }
        Command::Pending => {
            let pending = app.queue.pending().await?;
            if pending.is_empty() {
                println!("No scheduled notifications.");
            }
            for request in pending {
                let id = request
                    .data
                    .get(KEY_NOTIFICATION)
                    .and_then(|raw| serde_json::from_str::<NotificationSpec>(raw).ok())
                    .map(|spec| spec.id)
                    .unwrap_or_else(|| "?".into());
                let repeat = match request.kind {
                    WorkKind::OneShot => "once".to_string(),
                    WorkKind::Periodic { interval_minutes } => format!("every {interval_minutes}m"),
                };
                println!("  {:<24} {id:<20} {repeat}", request.unique_key);
            }
        }
        Command::Run => {
            let events = app.manager.events().stream();
            tokio::spawn(async move {
                tokio::pin!(events);
                while let Some(event) = events.next().await {
                    tracing::info!("📣 {} '{}'", event.kind, event.notification.id);
                }
            });

            let manager = app.manager.clone();
            let interval = Duration::from_secs(app.config.scheduler.check_interval_secs.max(1));
            let worker = tokio::spawn(beacon_scheduler::spawn_worker(
                app.queue.clone(),
                move |data| {
                    let manager = manager.clone();
                    async move { manager.run_scheduled_work(&data).await }
                },
                interval,
            ));

            tokio::signal::ctrl_c().await?;
            tracing::info!("👋 Shutting down work runner");
            worker.abort();
        }
    }

    Ok(())
}

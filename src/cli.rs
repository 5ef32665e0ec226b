use anyhow::{Context, bail};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use inquire::Text;
use tracing::info;

use crate::models::notification::NotificationModel;
use crate::runtime::Runtime;

pub const DEMO_ID: i32 = 999;
pub const DEMO_TITLE: &str = "予約通知テスト";
pub const DEMO_BODY: &str = "10秒後に予約した通知です";
pub const DEMO_DELAY_SECS: i64 = 10;

#[derive(Parser)]
#[command(about = "Local notifications for training reminders")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a notification immediately.
    Show {
        id: i32,
        title: String,
        body: String,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Schedule a notification for a later time.
    Schedule {
        id: i32,
        title: String,
        body: String,
        #[arg(long, conflicts_with = "in_seconds")]
        at: Option<DateTime<Utc>>,
        #[arg(long)]
        in_seconds: Option<i64>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Schedule a notification described by a JSON file.
    Model { path: String },
    /// Schedule the ten second test notification.
    Demo,
    /// Build a notification interactively.
    Prompt,
}

/// The test notification: fires ten seconds after `now`.
pub fn demo_model(now: DateTime<Utc>) -> NotificationModel {
    NotificationModel::new(
        DEMO_ID,
        DEMO_TITLE,
        DEMO_BODY,
        now + Duration::seconds(DEMO_DELAY_SECS),
        None,
    )
}

pub async fn cli(runtime: &Runtime) -> anyhow::Result<()> {
    let cli = Cli::parse();
    let scheduler = &runtime.scheduler;
    match cli.command {
        Commands::Show {
            id,
            title,
            body,
            icon,
        } => {
            scheduler
                .show_notification(id, &title, &body, icon.as_deref())
                .await;
            return Ok(());
        }
        Commands::Schedule {
            id,
            title,
            body,
            at,
            in_seconds,
            icon,
        } => {
            let scheduled_time = match (at, in_seconds) {
                (Some(at), _) => at,
                (None, Some(seconds)) => seconds_from_now(seconds)?,
                (None, None) => bail!("either --at or --in-seconds is required"),
            };
            let model = NotificationModel::new(id, title, body, scheduled_time, icon);
            scheduler.schedule_model(&model).await;
        }
        Commands::Model { path } => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path))?;
            let model: NotificationModel =
                serde_json::from_str(&content).context("parsing notification model")?;
            scheduler.schedule_model(&model).await;
        }
        Commands::Demo => {
            let model = demo_model(Utc::now());
            info!(id = model.id, at = %model.scheduled_time, "scheduling test notification");
            scheduler.schedule_model(&model).await;
        }
        Commands::Prompt => {
            let model = prompt_model()?;
            println!("{}", serde_json::to_string_pretty(&model)?);
            scheduler.schedule_model(&model).await;
        }
    }
    runtime.wait_for_pending().await;
    Ok(())
}

fn prompt_model() -> anyhow::Result<NotificationModel> {
    let id: i32 = Text::new("Notification id")
        .with_default("1")
        .prompt()?
        .trim()
        .parse()
        .context("id must be a number")?;
    let title = Text::new("Title").prompt()?;
    let message = Text::new("Message").prompt()?;
    let delay: i64 = Text::new("Seconds from now")
        .with_default("10")
        .prompt()?
        .trim()
        .parse()
        .context("delay must be a number")?;
    let icon = Text::new("Icon (alarm, task, meeting, alert, test, muscle, training)")
        .with_default("")
        .prompt()?;
    let icon_name = if icon.trim().is_empty() {
        None
    } else {
        Some(icon.trim().to_string())
    };
    Ok(NotificationModel::new(
        id,
        title,
        message,
        seconds_from_now(delay)?,
        icon_name,
    ))
}

fn seconds_from_now(seconds: i64) -> anyhow::Result<DateTime<Utc>> {
    let Some(offset) = Duration::try_seconds(seconds) else {
        bail!("{} seconds is out of range", seconds);
    };
    let Some(at) = Utc::now().checked_add_signed(offset) else {
        bail!("{} seconds from now is out of range", seconds);
    };
    Ok(at)
}

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use client::{LeaderboardClient, Poller, Submission, seed};
use storage::{
    Database,
    models::{Gender, Segment},
    repository::AthleteRecordRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stromohrot")]
#[command(about = "Stromohrot leaderboard client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the leaderboard and print it whenever it changes
    Watch {
        #[arg(long, env = "LEADERBOARD_URL", default_value = "http://localhost:3000")]
        url: String,

        #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 5)]
        interval: u64,

        #[arg(long, default_value = "5k")]
        segment: Segment,
    },
    /// Submit a time, then show the refreshed leaderboard
    Submit {
        #[arg(long, env = "LEADERBOARD_URL", default_value = "http://localhost:3000")]
        url: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        segment: Segment,

        /// Time as mm:ss
        #[arg(long)]
        time: String,

        #[arg(long)]
        gender: Option<Gender>,
    },
    /// Load the 5k fixture into the database
    Seed {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,

        /// Delete existing records for the fixture names first
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("stromohrot={},client={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Watch {
            url,
            interval,
            segment,
        } => {
            handle_watch(&url, Duration::from_secs(interval.max(1)), segment).await?;
        }
        Commands::Submit {
            url,
            name,
            segment,
            time,
            gender,
        } => {
            let submission = Submission {
                name,
                segment,
                time,
                gender,
            };
            handle_submit(&url, submission).await?;
        }
        Commands::Seed {
            database_url,
            reset,
        } => {
            handle_seed(&database_url, reset).await?;
        }
    }

    Ok(())
}

async fn handle_watch(url: &str, interval: Duration, segment: Segment) -> anyhow::Result<()> {
    tracing::info!("Polling {} every {}s", url, interval.as_secs());

    let api = LeaderboardClient::new(url)?;
    let mut poller = Poller::new(api, interval);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    poller
        .run(
            |view| {
                // clear screen and home the cursor
                print!("\x1b[2J\x1b[H");
                println!("{}", view.render(segment));
            },
            shutdown,
        )
        .await;

    Ok(())
}

async fn handle_submit(url: &str, submission: Submission) -> anyhow::Result<()> {
    let api = LeaderboardClient::new(url)?;
    let segment = submission.segment;
    let mut poller = Poller::new(api, client::poller::DEFAULT_POLL_INTERVAL);

    match poller.submit(&submission).await {
        Ok(response) => {
            tracing::debug!("Submission action: {:?}", response.action);
            println!("{}", poller.view().render(segment));
            Ok(())
        }
        Err(e) => Err(e).context("Submission failed"),
    }
}

async fn handle_seed(database_url: &str, reset: bool) -> anyhow::Result<()> {
    let db = Database::new(database_url)
        .await
        .context("Failed to initialize database")?;
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    let repo = AthleteRecordRepository::new(db.pool().clone());

    if reset {
        tracing::info!("Clearing existing seeded data...");
        let removed = repo.delete_by_names(&seed::seeded_names()).await?;
        tracing::info!("Removed {} records", removed);
    }

    let report = seed::seed(&repo).await?;
    println!(
        "Seeded 5k leaderboard: {} created, {} updated, {} unchanged",
        report.created, report.updated, report.unchanged
    );

    Ok(())
}

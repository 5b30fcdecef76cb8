mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelsync::config::Config;

#[derive(Parser)]
#[command(
    name = "reelsync",
    version,
    about = "Materialize channel reels into a program store and keep it in sync",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML config file; environment variables are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics to stdout after the command
    #[arg(long, global = true)]
    print_metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync pass now
    Sync {
        /// Only sync these channel ids (repeatable)
        #[arg(short = 'C', long = "channel")]
        channels: Vec<i64>,

        /// Window length in hours (defaults to the immediate lookahead)
        #[arg(long)]
        hours: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run sync passes periodically until Ctrl-C
    Watch,

    /// Print the programs a channel would get, without writing them
    Generate {
        /// Channel id
        channel: i64,

        /// Window start in epoch milliseconds (defaults to now)
        #[arg(long)]
        from: Option<i64>,

        /// Window length in hours
        #[arg(long, default_value = "24")]
        hours: u64,

        /// Print programs as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what a channel is airing
    Now {
        /// Channel id
        channel: i64,

        /// Instant in epoch milliseconds (defaults to now)
        #[arg(long)]
        at: Option<i64>,
    },

    /// Delete programs that ended a while ago
    Purge {
        /// Age threshold in hours
        #[arg(long, default_value = "24")]
        older_than_hours: u64,
    },

    /// Validate and print the effective configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    if let Err(e) = reelsync::metrics::init_metrics() {
        tracing::warn!(error = %e, "Failed to initialize metrics");
    }

    tracing::info!("reelsync starting");

    let result = match cli.command {
        Commands::Sync {
            channels,
            hours,
            json,
        } => {
            tracing::info!(
                channels = ?channels,
                hours = ?hours,
                "Starting sync command"
            );
            commands::sync(config, channels, hours, json).await
        }

        Commands::Watch => {
            tracing::info!(
                period_secs = config.sync.period_secs,
                "Starting watch command"
            );
            commands::watch(config).await
        }

        Commands::Generate {
            channel,
            from,
            hours,
            json,
        } => commands::generate(
            config,
            commands::GenerateParams {
                channel,
                from,
                hours,
                json,
            },
        ),

        Commands::Now { channel, at } => commands::now_playing(config, channel, at),

        Commands::Purge { older_than_hours } => {
            tracing::info!(older_than_hours, "Starting purge command");
            commands::purge(config, older_than_hours).await
        }

        Commands::CheckConfig => {
            println!("Configuration is valid:\n");
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    };

    if cli.print_metrics {
        match reelsync::metrics::encode_metrics() {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::warn!(error = %e, "Failed to encode metrics"),
        }
    }

    result
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("reelsync=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("reelsync={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

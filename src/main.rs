//! dualquery CLI
//!
//! Renders and runs time-series reads and writes against the configured
//! backend:
//! - Render a Flux read without touching the backend
//! - Read rows as JSON
//! - Write JSON rows from a file or stdin
//! - Check whether a bucket exists

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dualquery::cache::ReadOptions;
use dualquery::config::{generate_default_config, Config, LoggingConfig};
use dualquery::connector::TimeSeriesConnector;
use dualquery::flux::{render_read, ReadRequest};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dualquery")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render and run queries against relational and time-series backends")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the Flux query for a read
    Render(ReadArgs),

    /// Run a read and print rows as JSON
    Read {
        #[command(flatten)]
        read: ReadArgs,
        /// Skip the result cache lookup
        #[arg(long)]
        force_refresh: bool,
        /// Do not consult the result cache
        #[arg(long)]
        ignore_cache: bool,
    },

    /// Write JSON rows (an object or an array of objects)
    Write {
        /// Input file (default: stdin)
        input: Option<PathBuf>,
        /// Measurement (default: the configured default)
        #[arg(short, long)]
        measurement: Option<String>,
    },

    /// Check whether a bucket exists
    BucketExists {
        /// Bucket name
        name: String,
    },

    /// Print a default config file
    Config,
}

#[derive(Args)]
pub struct ReadArgs {
    /// Bucket (default: the configured bucket)
    #[arg(short, long)]
    pub bucket: Option<String>,
    /// Range start (default: the earliest instant)
    #[arg(long)]
    pub start: Option<String>,
    /// Range stop
    #[arg(long)]
    pub stop: Option<String>,
    /// Extra pipeline stage, repeatable
    #[arg(short = 'S', long = "stage")]
    pub stages: Vec<String>,
    /// Measurement filter
    #[arg(short, long)]
    pub measurement: Option<String>,
}

impl ReadArgs {
    fn request(&self, config: &Config) -> ReadRequest {
        let mut request = ReadRequest::new(
            self.bucket
                .clone()
                .unwrap_or_else(|| config.influx.bucket.clone()),
        )
        .organization(&config.influx.organization)
        .stages(self.stages.iter().cloned());

        request = match &self.start {
            Some(start) => request.start(start),
            None => request.from_beginning(),
        };
        if let Some(stop) = &self.stop {
            request = request.stop(stop);
        }
        if let Some(measurement) = &self.measurement {
            request = request.measurement(measurement);
        }
        request
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    match cli.command {
        Commands::Config => {
            print!("{}", generate_default_config());
        }
        Commands::Render(read) => {
            println!("{}", render_read(&read.request(&config)));
        }
        Commands::Read {
            read,
            force_refresh,
            ignore_cache,
        } => {
            let connector = connect(&config).await?;
            let mut options = ReadOptions::new();
            if force_refresh {
                options = options.force_refresh();
            }
            if ignore_cache {
                options = options.ignore_cache();
            }

            let rows = connector.read(&read.request(&config), options).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::Write { input, measurement } => {
            let content = match &input {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {:?}", path))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };
            let data: serde_json::Value =
                serde_json::from_str(&content).context("Input is not valid JSON")?;

            let connector = connect(&config).await?;
            let written = connector.write_json(&data, measurement.as_deref()).await?;
            println!("Wrote {} points to {}", written, connector.bucket());
        }
        Commands::BucketExists { name } => {
            let connector = connect(&config).await?;
            let exists = connector.bucket_exists(&name).await?;
            println!("{}", exists);
            if !exists {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn connect(config: &Config) -> anyhow::Result<TimeSeriesConnector> {
    let defaults = ReadOptions {
        force_refresh: config.cache.force_refresh,
        ignore_cache: config.cache.ignore_cache,
    };
    let connector = TimeSeriesConnector::connect(&config.influx)
        .await
        .with_context(|| format!("Failed to connect to {}", config.influx.url()))?
        .read_defaults(defaults);
    Ok(connector)
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("dualquery={}", logging.level).into());

    // Logs go to stderr so stdout stays parseable
    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

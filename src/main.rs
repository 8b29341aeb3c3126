use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use fredfetch::core::log::init_logging;
use fredfetch::persist::OutputFormat;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fredfetch::AppCommand {
    fn from(cmd: Commands) -> fredfetch::AppCommand {
        match cmd {
            Commands::Fetch { start_date, format } => {
                fredfetch::AppCommand::Fetch { start_date, format }
            }
            Commands::Update { days_back, format } => {
                fredfetch::AppCommand::Update { days_back, format }
            }
            Commands::Series {
                series_id,
                start_date,
                format,
            } => fredfetch::AppCommand::Series {
                series_id,
                start_date,
                format,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch full history for every indicator in the definitions directory
    Fetch {
        /// First observation date to request
        #[arg(long, default_value = fredfetch::DEFAULT_START_DATE)]
        start_date: NaiveDate,
        /// Output format: csv, json, or parquet
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },
    /// Refresh recent observations for every indicator
    Update {
        /// Rolling window size in days
        #[arg(long, default_value_t = 30)]
        days_back: i64,
        /// Output format: csv, json, or parquet
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },
    /// Fetch a single FRED series by identifier
    Series {
        /// FRED series identifier, e.g. GDPC1
        series_id: String,
        /// First observation date to request
        #[arg(long, default_value = "2020-01-01")]
        start_date: NaiveDate,
        /// Output format: csv, json, or parquet
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fredfetch::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fredfetch::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
# Directory holding the Bruno request-definition files (*.bru)
definitions_dir: "api/Economic Data"

# FRED API key. Leave unset to pick up the key embedded in the
# definition files instead.
# api_key: "your-fred-api-key"

providers:
  fred:
    base_url: "https://api.stlouisfed.org"

# Pause between successive API calls, in milliseconds
delay_ms: 500

# Output directory for fetched data files; defaults to the platform
# data directory when unset.
# data_path: "data"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}

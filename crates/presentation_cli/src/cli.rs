//! Command-line arguments

use std::path::PathBuf;

use application::DataKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use domain::IndustrySector;

/// Climate Advisor CLI
#[derive(Debug, Parser)]
#[command(name = "climate-advisor")]
#[command(author, version, about = "Climate impact analysis and recommendations", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze a location for a sector and ask for recommendations
    ///
    /// Example: climate-advisor analyze --location "Fresno, US" --sector agriculture
    Analyze(AnalyzeArgs),

    /// Show current conditions for a location
    Weather {
        /// Place name, optionally with a country, e.g. "Paris, FR"
        #[arg(short, long)]
        location: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List supported industry sectors
    Sectors,

    /// Load and validate configuration and threshold tables
    CheckConfig,

    /// List the narrative service's models and report its health
    Models,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Place name, optionally with a country, e.g. "Paris, FR"
    #[arg(short, long)]
    pub location: String,

    /// Industry sector
    #[arg(short, long, value_parser = parse_sector)]
    pub sector: IndustrySector,

    /// Free-text concerns passed to the advisor
    #[arg(long)]
    pub concerns: Option<String>,

    /// Data window (defaults to the configured window)
    #[arg(short, long, value_enum)]
    pub window: Option<Window>,

    /// Days of history for the historical window
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=365))]
    pub days: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Report rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Analysis windows selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Window {
    Statistical,
    Historical,
    Forecast,
}

impl From<Window> for DataKind {
    fn from(window: Window) -> Self {
        match window {
            Window::Statistical => Self::Statistical,
            Window::Historical => Self::Historical,
            Window::Forecast => Self::Forecast,
        }
    }
}

fn parse_sector(value: &str) -> Result<IndustrySector, String> {
    value.parse().map_err(|e: domain::DomainError| e.to_string())
}

/// Log filter for a `-v` count
pub const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

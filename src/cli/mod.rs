//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "riskctl")]
#[command(author, version, about = "Risk control evaluation for crypto trading accounts")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RISKCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a user's risk from an account snapshot
    Evaluate(EvaluateArgs),
    /// List the built-in risk controls
    Controls,
    /// Print the default risk profile
    Profile(ProfileArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProfileFormat {
    Toml,
    Json,
}

#[derive(clap::Args)]
pub struct EvaluateArgs {
    /// Account snapshot (JSON)
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Directory of daily candle CSV files ({SYMBOL}.csv or {SYMBOL}_1d.csv)
    #[arg(long)]
    pub candles: Option<PathBuf>,

    /// User to evaluate
    #[arg(short, long)]
    pub user: String,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Run controls concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Save the report (JSON) to a file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ProfileArgs {
    /// User id to stamp on the profile
    #[arg(short, long, default_value = "default")]
    pub user: String,

    /// Output format
    #[arg(long, value_enum, default_value = "toml")]
    pub format: ProfileFormat,
}

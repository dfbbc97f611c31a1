//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per problem plus totals
    Summary,
    /// Roles, winner and excluded units for every problem
    Full,
    /// The run report as JSON
    Json,
}

impl From<OutputFormat> for debate_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Summary => debate_domain::OutputFormat::Summary,
            OutputFormat::Full => debate_domain::OutputFormat::Full,
            OutputFormat::Json => debate_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for llm-debate
#[derive(Parser, Debug)]
#[command(name = "llm-debate")]
#[command(author, version, about = "Multi-agent LLM debate over a problem set")]
#[command(long_about = r#"
llm-debate runs a structured debate among four LLM agents for every problem
in a dataset.

Each debate has five stages:
1. Role assessment: every agent scores its fit for judging and solving
2. Solve: three solvers answer independently
3. Peer review: every solver reviews the other solutions
4. Refine: each solver revises its answer in light of the reviews
5. Judge: the judge picks the winning refined solution

Configuration files are loaded from (in priority order):
1. DEBATE_* environment variables (e.g. DEBATE_RUN__SESSIONS=1)
2. --config <path>     Explicit config file
3. ./debate.toml       Project-level config
4. ~/.config/llm-debate/config.toml   Global config

Example:
  llm-debate --problems data/datasets/problems.json --take 10
  llm-debate --skip 20 --take 5 --sessions 1 -v
  llm-debate --show-config
"#)]
pub struct Cli {
    /// Problem dataset (JSON array)
    #[arg(short, long, value_name = "PATH")]
    pub problems: Option<PathBuf>,

    /// Skip the first N problems
    #[arg(long, value_name = "N")]
    pub skip: Option<usize>,

    /// Debate at most N problems
    #[arg(long, value_name = "N")]
    pub take: Option<usize>,

    /// Maximum number of debate sessions running at once
    #[arg(long, value_name = "N")]
    pub sessions: Option<usize>,

    /// Directory receiving per-record JSON artifacts and JSONL collections
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Fail a unit when its record cannot be persisted
    #[arg(long)]
    pub strict_persistence: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write logs to daily-rotated files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Validate configuration and dataset, then exit without calling any provider
    #[arg(long)]
    pub dry_run: bool,
}

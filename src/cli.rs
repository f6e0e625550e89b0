//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::run_date::RunDate;

#[derive(Parser)]
#[command(name = "ikuai-ipgroup")]
#[command(
    author,
    version,
    about = "Generate iKuai IP group and ACL import files from a country IP list"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the IP list and write the IP group and ACL files (default)
    Generate(GenerateArgs),

    /// Check a local IP list file and report invalid lines
    Validate {
        /// IP list file, one CIDR per line
        file: PathBuf,
    },

    /// Print the default configuration, or save it to a file
    InitConfig {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show version
    Version,
}

#[derive(Args, Default)]
pub struct GenerateArgs {
    /// Read the IP list from a local file instead of downloading it
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Date stamp for file names, YYYYMMDD (default: UTC today + offset)
    #[arg(long)]
    pub date: Option<RunDate>,

    /// Fetch, validate and partition, but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

pub mod downloads;
pub mod rules;
pub mod scan;

use clap::{Parser, Subcommand};
use macsweep_lib::{ActionLog, Config, MacsweepError, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "macsweep")]
#[command(about = "Find and remove reclaimable files, and tidy up Downloads", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Path to the action log")]
    pub log_file: Option<PathBuf>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Scan a directory and report reclaimable space per category")]
    Scan {
        #[arg(help = "Directory to scan (defaults to your home directory)")]
        path: Option<PathBuf>,

        #[arg(long, short = 'd', help = "Maximum depth to descend")]
        depth: Option<usize>,

        #[arg(long, help = "Only scan the well-known cache and log locations")]
        quick: bool,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    #[command(about = "Scan, choose categories and delete their entries")]
    Clean {
        #[arg(help = "Directory to scan (defaults to your home directory)")]
        path: Option<PathBuf>,

        #[arg(long, short = 'd', help = "Maximum depth to descend")]
        depth: Option<usize>,

        #[arg(long, help = "Only scan the well-known cache and log locations")]
        quick: bool,

        #[arg(long = "category", short = 'c', help = "Category to clean (repeatable); skips the selection menu")]
        categories: Vec<String>,

        #[arg(long, help = "Show what would be deleted without deleting")]
        dry_run: bool,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    #[command(about = "Analyze or organize a Downloads folder")]
    Downloads {
        #[command(subcommand)]
        action: downloads::DownloadsCommands,
    },

    #[command(about = "List the cleanup rules in evaluation order")]
    Rules,
}

pub fn default_root() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| MacsweepError::Config("Cannot determine home directory".to_string()))
}

pub fn open_action_log(config: &Config) -> Result<ActionLog<BufWriter<File>>> {
    config.ensure_log_directory()?;
    ActionLog::open(&config.log_path)
}

mod cli;

use clap::Parser;
use macsweep_lib::{Config, Result};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::new(cli.config, cli.log_file)?;

    match cli.command {
        cli::Commands::Scan {
            path,
            depth,
            quick,
            json,
        } => cli::scan::handle_scan_command(&config, path, depth, quick, json),

        cli::Commands::Clean {
            path,
            depth,
            quick,
            categories,
            dry_run,
            yes,
        } => cli::scan::handle_clean_command(
            &config, path, depth, quick, categories, dry_run, yes,
        ),

        cli::Commands::Downloads { action } => {
            cli::downloads::handle_downloads_command(&config, action)
        }

        cli::Commands::Rules => cli::rules::handle_rules_command(&config),
    }
}

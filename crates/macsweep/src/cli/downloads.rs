use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use macsweep_lib::util::format_bytes;
use macsweep_lib::{
    ActionRecord, Config, DownloadsAnalysis, DownloadsAnalyzer, MacsweepError, OrganizeOptions,
    OrganizeSummary, Organizer, Result,
};
use std::path::PathBuf;

const TOP_EXTENSIONS: usize = 15;

#[derive(Subcommand)]
pub enum DownloadsCommands {
    #[command(about = "Break down a Downloads folder by format and extension")]
    Analyze {
        #[arg(help = "Folder to analyze (defaults to your Downloads folder)")]
        path: Option<PathBuf>,

        #[arg(long, help = "Print the analysis as JSON")]
        json: bool,
    },

    #[command(about = "Move files into one subfolder per format category")]
    Organize {
        #[arg(help = "Folder to organize (defaults to your Downloads folder)")]
        path: Option<PathBuf>,

        #[arg(long, help = "Show the planned moves without moving anything")]
        dry_run: bool,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },
}

pub fn handle_downloads_command(config: &Config, action: DownloadsCommands) -> Result<()> {
    match action {
        DownloadsCommands::Analyze { path, json } => {
            let path = resolve_downloads(path)?;
            let analysis = DownloadsAnalyzer::new(config.settings.sample_limit).analyze(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis);
            }
            Ok(())
        }
        DownloadsCommands::Organize { path, dry_run, yes } => {
            let path = resolve_downloads(path)?;
            organize_downloads(config, path, dry_run, yes)
        }
    }
}

fn resolve_downloads(path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = path {
        return Ok(path);
    }
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .ok_or_else(|| MacsweepError::Config("Cannot determine Downloads folder".to_string()))
}

fn print_analysis(analysis: &DownloadsAnalysis) {
    println!(
        "{} {}: {} files, {}",
        style(">>>").cyan(),
        style(analysis.root.display()).bold(),
        style(analysis.total_files).cyan(),
        style(format_bytes(analysis.total_bytes)).cyan()
    );

    if analysis.total_files > 0 {
        let mut cat_table = Table::new();
        cat_table.load_preset(UTF8_FULL);
        cat_table.set_header(vec![
            Cell::new("Format").fg(Color::Cyan),
            Cell::new("Files").fg(Color::Cyan),
            Cell::new("Size").fg(Color::Cyan),
        ]);
        for (category, stat) in analysis.by_size() {
            cat_table.add_row(vec![
                Cell::new(category.label()).fg(Color::White),
                Cell::new(stat.count),
                Cell::new(format_bytes(stat.total_size_bytes)),
            ]);
        }
        println!("\n{}", cat_table);

        let mut ext_table = Table::new();
        ext_table.load_preset(UTF8_FULL);
        ext_table.set_header(vec![
            Cell::new("Extension").fg(Color::Cyan),
            Cell::new("Files").fg(Color::Cyan),
            Cell::new("Size").fg(Color::Cyan),
            Cell::new("Examples").fg(Color::Cyan),
        ]);
        for stat in analysis.top_extensions(TOP_EXTENSIONS) {
            let ext = if stat.extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", stat.extension)
            };
            ext_table.add_row(vec![
                Cell::new(ext),
                Cell::new(stat.count),
                Cell::new(format_bytes(stat.total_size_bytes)),
                Cell::new(stat.sample_names.join(", ")),
            ]);
        }
        println!("\n{}", ext_table);
    }

    if analysis.folders.count > 0 {
        println!("  Folders: {}", style(analysis.folders.count).cyan());
    }
    if !analysis.errors.is_empty() {
        println!(
            "  {}: {} entries could not be read",
            style("Skipped").yellow(),
            analysis.errors.len()
        );
    }
}

fn organize_downloads(config: &Config, path: PathBuf, dry_run: bool, yes: bool) -> Result<()> {
    println!("{} Planning moves in {}...", style(">>>").cyan(), path.display());

    let mut planned: Vec<ActionRecord> = Vec::new();
    let plan = Organizer::new(&mut planned, OrganizeOptions { dry_run: true }).organize(&path)?;

    if plan.moves.is_empty() {
        println!("{}", style("Nothing to organize").green());
        return Ok(());
    }

    print_plan(&plan);

    if dry_run {
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Move {} files?", plan.total_moved()))
            .default(true)
            .interact()?;
        if !confirmed {
            println!("{}", style("Cancelled").yellow());
            return Ok(());
        }
    }

    let mut action_log = super::open_action_log(config)?;
    let summary =
        Organizer::new(&mut action_log, OrganizeOptions { dry_run: false }).organize(&path)?;

    println!("\n{} Organized {}", style("✓").green(), path.display());
    println!("  Moved: {}", style(summary.total_moved()).green());
    if summary.conflicts_resolved > 0 {
        println!("  Renamed to avoid overwrites: {}", style(summary.conflicts_resolved).cyan());
    }
    if !summary.failures.is_empty() {
        println!("  Failed: {}", style(summary.failures.len()).red());
        for failure in &summary.failures {
            println!("    {} {}", style("✗").red(), failure);
        }
    }
    println!("  Action log: {}", style(config.log_path.display()).dim());
    Ok(())
}

fn print_plan(plan: &OrganizeSummary) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Folder").fg(Color::Cyan),
        Cell::new("Files").fg(Color::Cyan),
    ]);
    for (category, count) in &plan.moved {
        table.add_row(vec![Cell::new(category.label()).fg(Color::White), Cell::new(count)]);
    }
    println!("\n{}", table);

    for record in plan.moves.iter().filter(|m| m.renamed) {
        println!(
            "  {} {} -> {}",
            style("~").yellow(),
            record.from.display(),
            record.to.display()
        );
    }
    if plan.skipped > 0 {
        println!("  Left in place: {}", style(plan.skipped).dim());
    }
    if !plan.failures.is_empty() {
        println!("  Will fail: {}", style(plan.failures.len()).red());
    }
}

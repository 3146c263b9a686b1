use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect};
use macsweep_lib::util::{create_progress_bar, create_spinner, format_bytes, format_duration};
use macsweep_lib::{
    AuditLog, CleanupOptions, CleanupSummary, Config, Deleter, MacsweepError, Result,
    RuleEngine, ScanReport, Scanner,
};
use std::path::PathBuf;

pub fn handle_scan_command(
    config: &Config,
    path: Option<PathBuf>,
    depth: Option<usize>,
    quick: bool,
    json: bool,
) -> Result<()> {
    let report = run_scan(config, path, depth, quick, !json, None)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

pub fn handle_clean_command(
    config: &Config,
    path: Option<PathBuf>,
    depth: Option<usize>,
    quick: bool,
    categories: Vec<String>,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let mut action_log = super::open_action_log(config)?;
    let report = run_scan(config, path, depth, quick, true, Some(&mut action_log))?;
    print_report(&report);

    if report.is_empty() {
        return Ok(());
    }

    let selected = if !categories.is_empty() {
        categories
    } else if yes {
        report.by_priority().iter().map(|c| c.category_id.clone()).collect()
    } else {
        select_categories(&report)?
    };

    if selected.is_empty() {
        println!("{}", style("Nothing selected").yellow());
        return Ok(());
    }

    let mut entry_count = 0;
    let mut byte_count = 0;
    for id in &selected {
        let category = report
            .category(id)
            .ok_or_else(|| MacsweepError::UserInput(format!("Unknown category: {}", id)))?;
        entry_count += category.file_count;
        byte_count += category.total_size_bytes;
    }

    if !dry_run && !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete {} entries ({})? This cannot be undone",
                entry_count,
                format_bytes(byte_count)
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", style("Cancelled").yellow());
            return Ok(());
        }
    }

    println!(
        "{} {} {} entries...",
        style(">>>").cyan(),
        if dry_run { "Simulating deletion of" } else { "Deleting" },
        entry_count
    );

    let progress = create_progress_bar(entry_count as u64, "Deleting");
    let summary = Deleter::new(&mut action_log, CleanupOptions { dry_run })
        .with_progress(progress)
        .delete_categories(&report, &selected)?;

    print_cleanup_summary(&summary);
    println!("  Action log: {}", style(config.log_path.display()).dim());
    Ok(())
}

fn run_scan(
    config: &Config,
    path: Option<PathBuf>,
    depth: Option<usize>,
    quick: bool,
    show_progress: bool,
    audit: Option<&mut dyn AuditLog>,
) -> Result<ScanReport> {
    if depth == Some(0) {
        return Err(MacsweepError::UserInput(
            "--depth must be at least 1".to_string(),
        ));
    }

    let root = match path {
        Some(path) => path,
        None => super::default_root()?,
    };

    let engine = RuleEngine::new(config.settings.rule_set()?)?;
    let options = config.settings.scan_options(depth, quick);

    if show_progress {
        println!(
            "{} Scanning {}{} (depth {})...",
            style(">>>").cyan(),
            style(root.display()).bold(),
            if quick { " (quick)" } else { "" },
            options.max_depth
        );
    }

    let mut scanner = Scanner::new(&engine, options);
    if let Some(audit) = audit {
        scanner = scanner.with_audit(audit);
    }
    let spinner = if show_progress {
        let spinner = create_spinner("Scanning");
        scanner = scanner.with_progress(spinner.clone());
        Some(spinner)
    } else {
        None
    };

    let report = scanner.scan(&root);

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    report
}

fn print_report(report: &ScanReport) {
    if report.is_empty() {
        println!("\n{} Nothing to clean up", style("✓").green());
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Category").fg(Color::Cyan),
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Entries").fg(Color::Cyan),
            Cell::new("Size").fg(Color::Cyan),
        ]);

        for category in report.by_priority() {
            table.add_row(vec![
                Cell::new(&category.display_name).fg(Color::White),
                Cell::new(&category.category_id),
                Cell::new(category.file_count),
                Cell::new(format_bytes(category.total_size_bytes)),
            ]);
        }

        println!("\n{}", table);
        println!(
            "  Total: {} entries, {}",
            style(report.total_files()).cyan(),
            style(format_bytes(report.total_bytes())).cyan()
        );
    }

    println!(
        "  Visited: {} files, {} directories in {}",
        report.stats.files_visited,
        report.stats.dirs_visited,
        format_duration(report.elapsed)
    );

    if !report.errors.is_empty() {
        println!(
            "  {}: {} entries could not be read (run with -v for details)",
            style("Skipped").yellow(),
            report.errors.len()
        );
    }
}

fn select_categories(report: &ScanReport) -> Result<Vec<String>> {
    let categories = report.by_priority();
    let items: Vec<String> = categories
        .iter()
        .map(|c| {
            format!(
                "{} ({} entries, {})",
                c.display_name,
                c.file_count,
                format_bytes(c.total_size_bytes)
            )
        })
        .collect();

    let selections = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select categories to clean (space to toggle, enter to confirm)")
        .items(&items)
        .interact()?;

    Ok(selections
        .into_iter()
        .map(|i| categories[i].category_id.clone())
        .collect())
}

fn print_cleanup_summary(summary: &CleanupSummary) {
    let heading = if summary.dry_run {
        "Dry run complete"
    } else {
        "Cleanup complete"
    };
    println!("\n{} {}", style("✓").green(), heading);
    println!(
        "  {}: {}",
        if summary.dry_run { "Would delete" } else { "Deleted" },
        style(summary.deleted).green()
    );
    println!(
        "  {}: {}",
        if summary.dry_run { "Would free" } else { "Freed" },
        style(format_bytes(summary.bytes_freed)).green()
    );

    if summary.skipped > 0 {
        println!("  Skipped: {}", style(summary.skipped).yellow());
    }
    if summary.failed > 0 {
        println!("  Failed: {}", style(summary.failed).red());
    }
    for error in summary.errors.iter().filter(|e| e.kind != macsweep_lib::ErrorKind::NotFound) {
        println!("    {} {}", style("✗").red(), error);
    }
}

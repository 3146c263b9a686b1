use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use console::style;
use macsweep_lib::{Config, Result, RuleEngine};

pub fn handle_rules_command(config: &Config) -> Result<()> {
    let engine = RuleEngine::new(config.settings.rule_set()?)?;

    if let Some(path) = &config.config_path {
        println!("{} Rules from built-ins and {}", style(">>>").cyan(), path.display());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Priority").fg(Color::Cyan),
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Applies to").fg(Color::Cyan),
        Cell::new("Matches").fg(Color::Cyan),
    ]);

    for rule in engine.rules() {
        table.add_row(vec![
            Cell::new(rule.priority),
            Cell::new(&rule.id).fg(Color::White),
            Cell::new(&rule.display_name),
            Cell::new(rule.target.as_str()),
            Cell::new(rule.rule_type.describe()),
        ]);
    }

    println!("{}", table);
    Ok(())
}

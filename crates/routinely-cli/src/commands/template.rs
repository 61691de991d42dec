//! Template catalog commands for CLI.

use clap::Subcommand;
use routinely_core::{CatalogStore, Config, Habit, HabitKind};

use super::load_catalog;

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List templates in the catalog
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one template by id or name
    Show {
        /// Template id or name
        template: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a starter catalog if none exists
    Init,
}

pub fn run(action: TemplateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        TemplateAction::List { json } => {
            let catalog = load_catalog(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog.templates)?);
                return Ok(());
            }
            if catalog.templates.is_empty() {
                println!("No templates. Use 'template init' to create a starter catalog.");
                return Ok(());
            }
            for template in &catalog.templates {
                let priority = template
                    .context_rule
                    .as_ref()
                    .map(|r| format!("priority {}", r.priority))
                    .unwrap_or_else(|| "no rule".into());
                println!(
                    "{:<16} {:<24} {} habits, {}",
                    template.id,
                    template.name,
                    template.habits.len(),
                    priority
                );
            }
        }
        TemplateAction::Show { template, json } => {
            let catalog = load_catalog(&config)?;
            let template = catalog.find_template(&template)?;
            if json {
                println!("{}", serde_json::to_string_pretty(template)?);
                return Ok(());
            }
            println!("{} ({})", template.name, template.id);
            if let Some(rule) = &template.context_rule {
                println!("rule: {}", serde_json::to_string(rule)?);
            }
            for habit in &template.habits {
                print_habit(habit, 1);
            }
        }
        TemplateAction::Init => {
            let store = CatalogStore::with_path(config.catalog_file()?);
            if store.init_sample()? {
                println!("Starter catalog written to {}", store.path().display());
            } else {
                println!("Catalog already exists at {}", store.path().display());
            }
        }
    }
    Ok(())
}

fn print_habit(habit: &Habit, level: usize) {
    let indent = "  ".repeat(level);
    let inactive = if habit.is_active { "" } else { " [inactive]" };
    let duration = habit
        .planned_duration_secs()
        .map(|s| format!(" {}m", s / 60))
        .unwrap_or_default();
    println!(
        "{indent}- {} [{}]{duration}{inactive}",
        habit.name,
        habit.kind.name()
    );
    if let HabitKind::Conditional { question, options } = &habit.kind {
        println!("{indent}  ? {question}");
        for option in options {
            println!("{indent}  * {} ({})", option.text, option.id);
            for sub in &option.habits {
                print_habit(sub, level + 2);
            }
        }
    }
}

//! Context resolution and template selection commands for CLI.

use chrono::{DateTime, FixedOffset, Local};
use clap::Args;
use routinely_core::{
    ranked_matches, select, Catalog, Config, Coordinates, RoutineContext, TimeSlot,
};

use super::load_catalog;

#[derive(Args, Clone)]
pub struct ContextArgs {
    /// Resolve at this time (RFC 3339) instead of now
    #[arg(long)]
    pub at: Option<String>,
    /// Current latitude
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Current longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
    /// Override the time slot (morning, afternoon, evening, night)
    #[arg(long)]
    pub time_slot: Option<TimeSlot>,
    /// Override the day category id
    #[arg(long)]
    pub day: Option<String>,
    /// Override the location id
    #[arg(long)]
    pub location: Option<String>,
}

impl ContextArgs {
    fn at(&self) -> Result<DateTime<FixedOffset>, Box<dyn std::error::Error>> {
        match &self.at {
            Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
                .map_err(|e| format!("invalid --at '{raw}': {e}"))?),
            None => Ok(Local::now().fixed_offset()),
        }
    }

    /// Resolve against the catalog, then apply explicit overrides.
    pub fn resolve(
        &self,
        config: &Config,
        catalog: &Catalog,
    ) -> Result<RoutineContext, Box<dyn std::error::Error>> {
        let position = self.lat.zip(self.lon).map(|(lat, lon)| Coordinates::new(lat, lon));
        let mut context = catalog
            .resolver(config.time_slots)
            .resolve(&self.at()?, position);

        if let Some(slot) = self.time_slot {
            context.time_slot = slot;
        }
        if let Some(day) = &self.day {
            context.day_category_id = Some(day.clone());
        }
        if let Some(location) = &self.location {
            context.location_id = Some(location.clone());
        }
        Ok(context)
    }
}

pub fn run_context(args: ContextArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let catalog = load_catalog(&config)?;
    let context = args.resolve(&config, &catalog)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        println!("time slot:    {}", context.time_slot);
        println!(
            "day category: {}",
            context.day_category_id.as_deref().unwrap_or("-")
        );
        println!("location:     {}", context.location_id.as_deref().unwrap_or("-"));
    }
    Ok(())
}

pub fn run_select(args: ContextArgs, all: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let catalog = load_catalog(&config)?;
    let context = args.resolve(&config, &catalog)?;

    if all {
        let matches = ranked_matches(&context, &catalog.templates);
        if json {
            println!("{}", serde_json::to_string_pretty(&matches)?);
        } else if matches.is_empty() {
            println!("No template matches the current context.");
        } else {
            for template in matches {
                let priority = template.context_rule.as_ref().map_or(0, |r| r.priority);
                println!("{:<16} {:<24} priority {priority}", template.id, template.name);
            }
        }
        return Ok(());
    }

    match select(&context, &catalog.templates) {
        Some(template) if json => println!("{}", serde_json::to_string_pretty(template)?),
        Some(template) => println!("{} ({})", template.name, template.id),
        None if json => println!("null"),
        None => println!("No template matches the current context."),
    }
    Ok(())
}

//! Template catalog storage.
//!
//! The catalog holds routine templates together with the day categories and
//! saved locations their context rules refer to. It is kept as one TOML file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::{
    ContextResolver, DayCategory, RoutineContextRule, SavedLocation, TimeSlot, TimeSlotBoundaries,
};
use crate::error::{CatalogError, Result};
use crate::habit::{ConditionalOption, Habit};
use crate::template::RoutineTemplate;

/// Everything the engine needs from the storage layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub day_categories: Vec<DayCategory>,
    #[serde(default)]
    pub locations: Vec<SavedLocation>,
    #[serde(default)]
    pub templates: Vec<RoutineTemplate>,
}

impl Catalog {
    /// Look a template up by id, falling back to a case-insensitive name match.
    pub fn find_template(&self, key: &str) -> Result<&RoutineTemplate, CatalogError> {
        self.templates
            .iter()
            .find(|t| t.id == key)
            .or_else(|| {
                self.templates
                    .iter()
                    .find(|t| t.name.eq_ignore_ascii_case(key))
            })
            .ok_or_else(|| CatalogError::TemplateNotFound(key.to_string()))
    }

    pub fn resolver(&self, boundaries: TimeSlotBoundaries) -> ContextResolver<'_> {
        ContextResolver::new(boundaries, &self.day_categories, &self.locations)
    }

    /// Reject catalogs where two entries of the same kind share an id.
    pub fn validate(&self) -> Result<(), CatalogError> {
        check_unique("template", self.templates.iter().map(|t| t.id.as_str()))?;
        check_unique("day category", self.day_categories.iter().map(|c| c.id.as_str()))?;
        check_unique("location", self.locations.iter().map(|l| l.id.as_str()))?;
        Ok(())
    }

    /// A small starter catalog written on first use.
    pub fn sample() -> Self {
        let morning = RoutineTemplate::new(
            "Morning",
            vec![
                Habit::task("Make bed").with_id("make-bed").with_order(0),
                Habit::timer("Stretch", 300).with_id("stretch").with_order(1),
                Habit::conditional(
                    "Workout check",
                    "Working out this morning?",
                    vec![
                        ConditionalOption::new(
                            "Yes",
                            vec![
                                Habit::task("Put on gym clothes").with_id("gym-clothes"),
                                Habit::timer("Workout", 1800).with_id("workout"),
                            ],
                        )
                        .with_id("workout-yes"),
                        ConditionalOption::new("No", vec![]).with_id("workout-no"),
                    ],
                )
                .with_id("workout-check")
                .with_order(2),
                Habit::task("Breakfast").with_id("breakfast").with_order(3),
            ],
        )
        .with_id("morning")
        .with_color("#f59e0b")
        .with_rule(
            RoutineContextRule::new(5)
                .time_slot(TimeSlot::Morning)
                .location("home"),
        );

        let wind_down = RoutineTemplate::new(
            "Wind down",
            vec![
                Habit::task("Tidy desk").with_id("tidy-desk"),
                Habit::timer("Read", 1200).with_id("read"),
            ],
        )
        .with_id("wind-down")
        .with_color("#6366f1")
        .with_rule(RoutineContextRule::new(3).time_slot(TimeSlot::Evening));

        Self {
            day_categories: vec![
                DayCategory {
                    id: "weekday".into(),
                    name: "Weekday".into(),
                    days: vec![1, 2, 3, 4, 5],
                },
                DayCategory {
                    id: "weekend".into(),
                    name: "Weekend".into(),
                    days: vec![0, 6],
                },
            ],
            locations: Vec::new(),
            templates: vec![morning, wind_down],
        }
    }
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

/// TOML file holding the [`Catalog`].
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the catalog; a missing file yields an empty catalog.
    pub fn load(&self) -> Result<Catalog> {
        if !self.path.exists() {
            warn!(path = %self.path.display(), "catalog file not found");
            return Ok(Catalog::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let catalog: Catalog = toml::from_str(&content)?;
        catalog.validate()?;
        debug!(templates = catalog.templates.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        catalog.validate()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(catalog)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Write the sample catalog unless a file already exists.
    pub fn init_sample(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&Catalog::sample())?;
        Ok(true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

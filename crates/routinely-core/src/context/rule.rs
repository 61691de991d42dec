//! Context snapshot and per-template matching rule.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse part of the day a routine belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 4] = [
        TimeSlot::Morning,
        TimeSlot::Afternoon,
        TimeSlot::Evening,
        TimeSlot::Night,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
            TimeSlot::Night => "night",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "morning" => Ok(TimeSlot::Morning),
            "afternoon" => Ok(TimeSlot::Afternoon),
            "evening" => Ok(TimeSlot::Evening),
            "night" => Ok(TimeSlot::Night),
            other => Err(format!("unknown time slot: {other}")),
        }
    }
}

/// The resolved "where and when am I" used for automatic selection.
///
/// `None` means the dimension could not be resolved (no location fix, no
/// day category covering today).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineContext {
    pub time_slot: TimeSlot,
    #[serde(default)]
    pub day_category_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
}

impl RoutineContext {
    pub fn new(time_slot: TimeSlot) -> Self {
        Self {
            time_slot,
            day_category_id: None,
            location_id: None,
        }
    }

    pub fn with_day_category(mut self, id: impl Into<String>) -> Self {
        self.day_category_id = Some(id.into());
        self
    }

    pub fn with_location(mut self, id: impl Into<String>) -> Self {
        self.location_id = Some(id.into());
        self
    }
}

/// Criteria a template declares for automatic selection.
///
/// Each set is a wildcard when empty. All three dimensions must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineContextRule {
    #[serde(default)]
    pub time_slots: BTreeSet<TimeSlot>,
    #[serde(default)]
    pub day_category_ids: BTreeSet<String>,
    #[serde(default)]
    pub location_ids: BTreeSet<String>,
    /// Higher wins among several matching templates.
    #[serde(default)]
    pub priority: i32,
}

impl RoutineContextRule {
    pub fn new(priority: i32) -> Self {
        Self {
            priority,
            ..Self::default()
        }
    }

    pub fn time_slot(mut self, slot: TimeSlot) -> Self {
        self.time_slots.insert(slot);
        self
    }

    pub fn day_category(mut self, id: impl Into<String>) -> Self {
        self.day_category_ids.insert(id.into());
        self
    }

    pub fn location(mut self, id: impl Into<String>) -> Self {
        self.location_ids.insert(id.into());
        self
    }

    /// True when every dimension is a wildcard or contains the snapshot value.
    pub fn matches(&self, context: &RoutineContext) -> bool {
        let time_ok = self.time_slots.is_empty() || self.time_slots.contains(&context.time_slot);
        time_ok
            && dimension_matches(&self.day_category_ids, context.day_category_id.as_deref())
            && dimension_matches(&self.location_ids, context.location_id.as_deref())
    }
}

fn dimension_matches(accepted: &BTreeSet<String>, value: Option<&str>) -> bool {
    if accepted.is_empty() {
        return true;
    }
    value.is_some_and(|v| accepted.contains(v))
}

//! Routine templates: an ordered habit list plus optional context rule.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::RoutineContextRule;
use crate::error::SessionError;
use crate::habit::Habit;

/// Default nesting limit for conditional habits.
pub const DEFAULT_MAX_BRANCH_DEPTH: usize = 2;

/// A reusable routine definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineTemplate {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    /// Automatic-selection rule. Templates without one are only reachable
    /// through explicit choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_rule: Option<RoutineContextRule>,
    #[serde(default)]
    pub habits: Vec<Habit>,
}

fn default_color() -> String {
    "#3b82f6".into()
}

impl RoutineTemplate {
    pub fn new(name: impl Into<String>, habits: Vec<Habit>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: default_color(),
            context_rule: None,
            habits,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_rule(mut self, rule: RoutineContextRule) -> Self {
        self.context_rule = Some(rule);
        self
    }

    /// Habits that take part in a new session, in list order.
    pub fn active_habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter().filter(|h| h.is_active)
    }

    /// Deepest conditional nesting anywhere in the template.
    pub fn branch_depth(&self) -> usize {
        self.habits
            .iter()
            .map(Habit::conditional_depth)
            .max()
            .unwrap_or(0)
    }

    /// Reject templates whose conditional habits nest deeper than `max`.
    ///
    /// Inactive top-level habits are checked too; they can be re-enabled
    /// without passing through the editor again.
    pub fn validate_branch_depth(&self, max: usize) -> Result<(), SessionError> {
        match self.habits.iter().find(|h| h.conditional_depth() > max) {
            Some(habit) => Err(SessionError::BranchTooDeep {
                habit_id: habit.id.clone(),
                depth: habit.conditional_depth(),
                max,
            }),
            None => Ok(()),
        }
    }
}

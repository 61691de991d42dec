//! Habit data model.
//!
//! A habit is one step of a routine. Its [`HabitKind`] decides how the UI
//! interacts with it; the session engine only cares whether a habit is a
//! conditional branch point.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a tracking habit records its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TrackingMode {
    /// Count up towards a target (e.g. glasses of water).
    Counter { target: u32, unit: String },
    /// Record a free measurement (e.g. body weight).
    Measurement { unit: String },
}

/// One step of a guided sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidedStep {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

/// Behavioral kind of a habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HabitKind {
    Task,
    Timer {
        duration_secs: u64,
    },
    /// Opens something outside the app (a URL or app identifier).
    ExternalAction {
        target: String,
    },
    Tracking {
        tracking: TrackingMode,
    },
    GuidedSequence {
        steps: Vec<GuidedStep>,
    },
    /// A question whose answer decides which sub-habits run next.
    Conditional {
        question: String,
        options: Vec<ConditionalOption>,
    },
}

impl HabitKind {
    pub fn name(&self) -> &str {
        match self {
            HabitKind::Task => "task",
            HabitKind::Timer { .. } => "timer",
            HabitKind::ExternalAction { .. } => "external_action",
            HabitKind::Tracking { .. } => "tracking",
            HabitKind::GuidedSequence { .. } => "guided_sequence",
            HabitKind::Conditional { .. } => "conditional",
        }
    }
}

/// One answer to a conditional habit's question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalOption {
    pub id: String,
    pub text: String,
    /// Sub-path executed when this option is chosen.
    #[serde(default)]
    pub habits: Vec<Habit>,
}

impl ConditionalOption {
    pub fn new(text: impl Into<String>, habits: Vec<Habit>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            habits,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// A named step of a routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Authoring-time ordering. The running queue uses list position instead.
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub kind: HabitKind,
}

fn default_true() -> bool {
    true
}

impl Habit {
    pub fn new(name: impl Into<String>, kind: HabitKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            order: 0,
            is_active: true,
            kind,
        }
    }

    pub fn task(name: impl Into<String>) -> Self {
        Self::new(name, HabitKind::Task)
    }

    pub fn timer(name: impl Into<String>, duration_secs: u64) -> Self {
        Self::new(name, HabitKind::Timer { duration_secs })
    }

    pub fn conditional(
        name: impl Into<String>,
        question: impl Into<String>,
        options: Vec<ConditionalOption>,
    ) -> Self {
        Self::new(
            name,
            HabitKind::Conditional {
                question: question.into(),
                options,
            },
        )
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self.kind, HabitKind::Conditional { .. })
    }

    /// Options of a conditional habit; empty for every other kind.
    pub fn options(&self) -> &[ConditionalOption] {
        match &self.kind {
            HabitKind::Conditional { options, .. } => options,
            _ => &[],
        }
    }

    /// A conditional needs at least two options to branch.
    pub fn is_runnable_conditional(&self) -> bool {
        self.options().len() >= 2
    }

    pub fn option(&self, option_id: &str) -> Option<&ConditionalOption> {
        self.options().iter().find(|o| o.id == option_id)
    }

    pub fn option_by_text(&self, text: &str) -> Option<&ConditionalOption> {
        self.options().iter().find(|o| o.text == text)
    }

    /// Number of conditional levels in this habit's subtree.
    ///
    /// A plain habit is 0, a conditional whose options hold only plain habits
    /// is 1, and so on.
    pub fn conditional_depth(&self) -> usize {
        match &self.kind {
            HabitKind::Conditional { options, .. } => {
                1 + options
                    .iter()
                    .flat_map(|o| o.habits.iter())
                    .map(Habit::conditional_depth)
                    .max()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Estimated duration in seconds, when the kind carries one.
    pub fn planned_duration_secs(&self) -> Option<u64> {
        match &self.kind {
            HabitKind::Timer { duration_secs } => Some(*duration_secs),
            HabitKind::GuidedSequence { steps } => {
                let total: u64 = steps.iter().filter_map(|s| s.duration_secs).sum();
                (total > 0).then_some(total)
            }
            _ => None,
        }
    }
}

//! Completion records and the typed payload a step is completed with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::habit::Habit;

/// Prefix the legacy notes format used to encode a chosen option.
pub const LEGACY_SELECTED_PREFIX: &str = "Selected: ";
/// Notes value the legacy format used for an unanswered question.
pub const LEGACY_SKIPPED_SENTINEL: &str = "Skipped";

/// What the interaction UI reports when a step is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CompletionPayload {
    /// Regular completion with optional free-text notes.
    Plain(Option<String>),
    /// Answer to a conditional habit, by option id.
    Answer(String),
    /// The question was acknowledged without choosing a branch.
    Skip,
}

impl Default for CompletionPayload {
    fn default() -> Self {
        CompletionPayload::Plain(None)
    }
}

impl CompletionPayload {
    pub fn notes(notes: impl Into<String>) -> Self {
        CompletionPayload::Plain(Some(notes.into()))
    }

    pub fn answer(option_id: impl Into<String>) -> Self {
        CompletionPayload::Answer(option_id.into())
    }
}

/// Convert the legacy notes encoding into a typed payload.
///
/// `"Selected: <text>"` becomes an [`CompletionPayload::Answer`] when `habit`
/// has an option with that text, and the skipped sentinel becomes
/// [`CompletionPayload::Skip`]. Anything else is kept as plain notes.
pub fn parse_legacy_notes(habit: &Habit, notes: Option<&str>) -> CompletionPayload {
    let Some(notes) = notes else {
        return CompletionPayload::Plain(None);
    };
    if habit.is_conditional() {
        if notes == LEGACY_SKIPPED_SENTINEL {
            return CompletionPayload::Skip;
        }
        if let Some(option) = notes
            .strip_prefix(LEGACY_SELECTED_PREFIX)
            .and_then(|text| habit.option_by_text(text.trim()))
        {
            return CompletionPayload::Answer(option.id.clone());
        }
    }
    CompletionPayload::Plain(Some(notes.to_string()))
}

/// One entry of a session's append-only completion log.
///
/// A habit revisited with `go_to_previous` and completed again gets a second
/// entry, so "is this habit done" means "any entry exists".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub habit_id: String,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub duration_secs: Option<u64>,
    /// Free text, or the chosen option's text for an answered question.
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub selected_option_id: Option<String>,
    #[serde(default)]
    pub is_skipped: bool,
}

impl HabitCompletion {
    pub(crate) fn completed(
        habit_id: &str,
        at: DateTime<Utc>,
        duration_secs: Option<u64>,
        notes: Option<String>,
        selected_option_id: Option<String>,
    ) -> Self {
        Self {
            habit_id: habit_id.to_string(),
            completed_at: at,
            duration_secs,
            notes,
            selected_option_id,
            is_skipped: false,
        }
    }

    pub(crate) fn skipped(habit_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            habit_id: habit_id.to_string(),
            completed_at: at,
            duration_secs: None,
            notes: None,
            selected_option_id: None,
            is_skipped: true,
        }
    }
}

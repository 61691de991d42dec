use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every session state change produces an event.
/// Commands return the events they caused; the coordinator also pushes them
/// to registered observers so cached views know to re-read session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    SessionStarted {
        session_id: String,
        template_id: String,
        queue_len: usize,
        at: DateTime<Utc>,
    },
    HabitCompleted {
        habit_id: String,
        index: usize,
        at: DateTime<Utc>,
    },
    HabitSkipped {
        habit_id: String,
        index: usize,
        at: DateTime<Utc>,
    },
    /// A conditional answer inserted the option's habits after `index`.
    BranchExpanded {
        habit_id: String,
        option_id: String,
        index: usize,
        inserted: usize,
        queue_len: usize,
        at: DateTime<Utc>,
    },
    CursorMoved {
        from: usize,
        to: usize,
        at: DateTime<Utc>,
    },
    SessionFinished {
        session_id: String,
        completions: usize,
        at: DateTime<Utc>,
    },
    SessionCancelled {
        session_id: String,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// True when observers holding a cached copy of the queue must re-read it.
    pub fn changes_queue(&self) -> bool {
        matches!(
            self,
            SessionEvent::SessionStarted { .. }
                | SessionEvent::BranchExpanded { .. }
                | SessionEvent::SessionCancelled { .. }
        )
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            SessionEvent::SessionStarted { at, .. }
            | SessionEvent::HabitCompleted { at, .. }
            | SessionEvent::HabitSkipped { at, .. }
            | SessionEvent::BranchExpanded { at, .. }
            | SessionEvent::CursorMoved { at, .. }
            | SessionEvent::SessionFinished { at, .. }
            | SessionEvent::SessionCancelled { at, .. } => *at,
        }
    }
}

mod completion;
mod coordinator;
mod engine;

pub use completion::{
    parse_legacy_notes, CompletionPayload, HabitCompletion, LEGACY_SELECTED_PREFIX,
    LEGACY_SKIPPED_SENTINEL,
};
pub use coordinator::{RoutineCoordinator, SessionObserver};
pub use engine::{RoutineSession, SessionSummary};

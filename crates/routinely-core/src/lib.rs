//! # Routinely Core Library
//!
//! This library provides the routine execution engine behind Routinely, a
//! habit-tracking application. All behavior is available through the
//! standalone CLI binary; mobile and desktop front ends are thin layers over
//! the same core.
//!
//! ## Architecture
//!
//! - **Routine Session**: a queue/cursor state machine over a template's
//!   habits that expands conditional habits in place when they are answered
//! - **Context Selector**: pure ranking that picks the template matching the
//!   current time slot, day category and location
//! - **Coordinator**: the single owner of the active session, forwarding
//!   change events to observers
//! - **Storage**: TOML configuration and catalog, JSON session snapshots
//!
//! ## Key Components
//!
//! - [`RoutineSession`]: Core session state machine
//! - [`RoutineCoordinator`]: Active-session holder
//! - [`select`]: Context-based template selection
//! - [`Config`]: Application configuration management

pub mod context;
pub mod error;
pub mod events;
pub mod habit;
pub mod session;
pub mod storage;
pub mod template;

pub use context::{
    ranked_matches, select, ContextResolver, Coordinates, DayCategory, RoutineContext,
    RoutineContextRule, SavedLocation, TimeSlot, TimeSlotBoundaries,
};
pub use error::{CatalogError, ConfigError, CoreError, Result, SessionError};
pub use events::SessionEvent;
pub use habit::{ConditionalOption, GuidedStep, Habit, HabitKind, TrackingMode};
pub use session::{
    parse_legacy_notes, CompletionPayload, HabitCompletion, RoutineCoordinator, RoutineSession,
    SessionObserver, SessionSummary,
};
pub use storage::{Catalog, CatalogStore, Config, SessionStore};
pub use template::{RoutineTemplate, DEFAULT_MAX_BRANCH_DEPTH};

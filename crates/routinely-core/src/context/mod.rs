//! Context matching: which routine fits right now.

mod resolver;
mod rule;
mod selector;

pub use resolver::{ContextResolver, Coordinates, DayCategory, SavedLocation, TimeSlotBoundaries};
pub use rule::{RoutineContext, RoutineContextRule, TimeSlot};
pub use selector::{ranked_matches, select};

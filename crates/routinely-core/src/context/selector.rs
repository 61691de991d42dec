//! Context-based template selection.
//!
//! Pure functions over borrowed data: no I/O, no shared state, safe to call
//! from any number of readers.
//!
//! ## Ranking
//!
//! 1. Only templates with a context rule that matches the snapshot qualify.
//! 2. Higher `priority` wins.
//! 3. Equal priorities fall back to catalog order (earlier wins).

use tracing::debug;

use super::rule::RoutineContext;
use crate::template::RoutineTemplate;

/// Pick the best-fitting template for `context`, if any.
///
/// Returns `None` when no template matches; choosing a fallback (default or
/// most recently used) is up to the caller.
pub fn select<'a>(
    context: &RoutineContext,
    templates: &'a [RoutineTemplate],
) -> Option<&'a RoutineTemplate> {
    let mut best: Option<(&RoutineTemplate, i32)> = None;
    for template in templates {
        let Some(priority) = matching_priority(template, context) else {
            continue;
        };
        // Strictly greater keeps the first template among equal priorities.
        if best.is_none_or(|(_, p)| priority > p) {
            best = Some((template, priority));
        }
    }

    match best {
        Some((template, priority)) => {
            debug!(template_id = %template.id, priority, "selected routine template");
            Some(template)
        }
        None => {
            debug!(time_slot = %context.time_slot, "no routine template matches context");
            None
        }
    }
}

/// Every matching template, best first.
pub fn ranked_matches<'a>(
    context: &RoutineContext,
    templates: &'a [RoutineTemplate],
) -> Vec<&'a RoutineTemplate> {
    let mut matches: Vec<(&RoutineTemplate, i32)> = templates
        .iter()
        .filter_map(|t| matching_priority(t, context).map(|p| (t, p)))
        .collect();
    // Stable sort keeps catalog order within a priority.
    matches.sort_by(|a, b| b.1.cmp(&a.1));
    matches.into_iter().map(|(t, _)| t).collect()
}

fn matching_priority(template: &RoutineTemplate, context: &RoutineContext) -> Option<i32> {
    let rule = template.context_rule.as_ref()?;
    rule.matches(context).then_some(rule.priority)
}

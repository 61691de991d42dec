//! Single owner of the active routine session.
//!
//! There is at most one active session. Starting a new one replaces the
//! previous session; finishing or cancelling clears the slot. Mutations go
//! through `&mut self`, so callers are serialized by construction, and
//! observers are notified on the same call path right after the mutation.

use tracing::{debug, warn};

use super::completion::CompletionPayload;
use super::engine::RoutineSession;
use crate::error::SessionError;
use crate::events::SessionEvent;
use crate::template::{RoutineTemplate, DEFAULT_MAX_BRANCH_DEPTH};

type Result<T> = std::result::Result<T, SessionError>;

/// Receives every event the coordinator produces.
pub trait SessionObserver {
    fn on_event(&self, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: Fn(&SessionEvent),
{
    fn on_event(&self, event: &SessionEvent) {
        self(event)
    }
}

/// Holds the active session and fans events out to observers.
pub struct RoutineCoordinator {
    session: Option<RoutineSession>,
    observers: Vec<Box<dyn SessionObserver>>,
    max_branch_depth: usize,
}

impl Default for RoutineCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BRANCH_DEPTH)
    }
}

impl RoutineCoordinator {
    pub fn new(max_branch_depth: usize) -> Self {
        Self {
            session: None,
            observers: Vec::new(),
            max_branch_depth,
        }
    }

    /// Resume a previously persisted session.
    pub fn with_session(mut self, session: RoutineSession) -> Self {
        self.session = Some(session);
        self
    }

    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<&RoutineSession> {
        self.session.as_ref()
    }

    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn max_branch_depth(&self) -> usize {
        self.max_branch_depth
    }

    /// Give up ownership of the active session (e.g. to persist it).
    pub fn into_session(self) -> Option<RoutineSession> {
        self.session
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session for `template`, replacing any active one.
    pub fn start(&mut self, template: RoutineTemplate) -> Result<Vec<SessionEvent>> {
        let session = RoutineSession::start(template, self.max_branch_depth)?;
        if let Some(previous) = self.session.take() {
            warn!(session_id = %previous.id(), "replacing active routine session");
        }
        let events = vec![session.started_event()];
        self.session = Some(session);
        self.notify(&events);
        Ok(events)
    }

    pub fn complete_current(
        &mut self,
        duration_secs: Option<u64>,
        payload: CompletionPayload,
    ) -> Result<Vec<SessionEvent>> {
        let events = self
            .active_mut()?
            .complete_current(duration_secs, payload)?;
        self.notify(&events);
        Ok(events)
    }

    pub fn skip_current(&mut self) -> Result<Vec<SessionEvent>> {
        let events = self.active_mut()?.skip_current()?;
        self.notify(&events);
        Ok(events)
    }

    pub fn go_to_previous(&mut self) -> Result<Vec<SessionEvent>> {
        let events: Vec<_> = self.active_mut()?.go_to_previous()?.into_iter().collect();
        self.notify(&events);
        Ok(events)
    }

    pub fn go_to(&mut self, index: usize) -> Result<Vec<SessionEvent>> {
        let events: Vec<_> = self.active_mut()?.go_to(index)?.into_iter().collect();
        self.notify(&events);
        Ok(events)
    }

    /// Finish the active session and hand it back for history keeping.
    pub fn finalize_complete(&mut self) -> Result<RoutineSession> {
        let event = self.active_mut()?.finalize_complete()?;
        let finished = self.session.take().ok_or(SessionError::NoActiveSession)?;
        self.notify(std::slice::from_ref(&event));
        Ok(finished)
    }

    /// Drop the active session without keeping any of it.
    pub fn cancel(&mut self) -> Result<()> {
        if self.active_mut()?.is_completed() {
            return Err(SessionError::AlreadyFinalized);
        }
        let session = self.session.take().ok_or(SessionError::NoActiveSession)?;
        let event = session.cancel()?;
        self.notify(std::slice::from_ref(&event));
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn active_mut(&mut self) -> Result<&mut RoutineSession> {
        self.session.as_mut().ok_or(SessionError::NoActiveSession)
    }

    fn notify(&self, events: &[SessionEvent]) {
        if events.is_empty() {
            return;
        }
        for event in events {
            for observer in &self.observers {
                observer.on_event(event);
            }
        }
        debug!(count = events.len(), observers = self.observers.len(), "session events dispatched");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{ConditionalOption, Habit};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn template() -> RoutineTemplate {
        RoutineTemplate::new(
            "Morning",
            vec![
                Habit::conditional(
                    "Q",
                    "Gym today?",
                    vec![
                        ConditionalOption::new("Yes", vec![Habit::task("Pack bag").with_id("bag")])
                            .with_id("yes"),
                        ConditionalOption::new("No", vec![]).with_id("no"),
                    ],
                )
                .with_id("Q"),
                Habit::task("Breakfast").with_id("breakfast"),
            ],
        )
        .with_id("morning")
    }

    fn recording(coordinator: &mut RoutineCoordinator) -> Rc<RefCell<Vec<SessionEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        coordinator.subscribe(move |event: &SessionEvent| sink.borrow_mut().push(event.clone()));
        log
    }

    #[test]
    fn commands_without_session_fail() {
        let mut coordinator = RoutineCoordinator::default();
        assert_eq!(
            coordinator.complete_current(None, CompletionPayload::default()),
            Err(SessionError::NoActiveSession)
        );
        assert_eq!(coordinator.skip_current(), Err(SessionError::NoActiveSession));
        assert_eq!(coordinator.go_to(0), Err(SessionError::NoActiveSession));
        assert_eq!(coordinator.cancel(), Err(SessionError::NoActiveSession));
        assert!(matches!(
            coordinator.finalize_complete(),
            Err(SessionError::NoActiveSession)
        ));
    }

    #[test]
    fn failed_cancel_keeps_finalized_session() {
        let mut finished = RoutineSession::start(template(), DEFAULT_MAX_BRANCH_DEPTH).unwrap();
        finished.finalize_complete().unwrap();
        let mut coordinator = RoutineCoordinator::default().with_session(finished);
        let log = recording(&mut coordinator);

        assert_eq!(coordinator.cancel(), Err(SessionError::AlreadyFinalized));
        assert!(coordinator.has_active_session());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn observers_see_expansion_and_cursor_moves() {
        let mut coordinator = RoutineCoordinator::default();
        let log = recording(&mut coordinator);

        coordinator.start(template()).unwrap();
        coordinator
            .complete_current(None, CompletionPayload::answer("yes"))
            .unwrap();

        let log = log.borrow();
        assert!(matches!(log[0], SessionEvent::SessionStarted { queue_len: 2, .. }));
        assert!(log
            .iter()
            .any(|e| matches!(e, SessionEvent::BranchExpanded { inserted: 1, .. })));
        assert!(matches!(
            log.last(),
            Some(SessionEvent::CursorMoved { from: 0, to: 1, .. })
        ));
    }

    #[test]
    fn state_is_consistent_when_observer_runs() {
        let mut coordinator = RoutineCoordinator::default();
        coordinator.start(template()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        coordinator.subscribe(move |event: &SessionEvent| {
            if let SessionEvent::BranchExpanded { queue_len, .. } = event {
                sink.borrow_mut().push(*queue_len);
            }
        });
        coordinator
            .complete_current(None, CompletionPayload::answer("yes"))
            .unwrap();
        assert_eq!(*seen.borrow(), vec![3]);
        assert_eq!(coordinator.session().unwrap().queue().len(), 3);
    }

    #[test]
    fn start_replaces_previous_session() {
        let mut coordinator = RoutineCoordinator::default();
        coordinator.start(template()).unwrap();
        let first = coordinator.session().unwrap().id().to_string();
        coordinator.skip_current().unwrap();

        coordinator.start(template()).unwrap();
        let session = coordinator.session().unwrap();
        assert_ne!(session.id(), first);
        assert_eq!(session.cursor(), 0);
        assert!(session.completions().is_empty());
    }

    #[test]
    fn finalize_returns_session_and_clears_slot() {
        let mut coordinator = RoutineCoordinator::default();
        let log = recording(&mut coordinator);
        coordinator.start(template()).unwrap();
        coordinator.skip_current().unwrap();

        let finished = coordinator.finalize_complete().unwrap();
        assert!(finished.is_completed());
        assert_eq!(finished.completions().len(), 1);
        assert!(!coordinator.has_active_session());
        assert!(matches!(
            log.borrow().last(),
            Some(SessionEvent::SessionFinished { completions: 1, .. })
        ));
        assert!(matches!(
            coordinator.finalize_complete(),
            Err(SessionError::NoActiveSession)
        ));
    }

    #[test]
    fn cancel_discards_session() {
        let mut coordinator = RoutineCoordinator::default();
        let log = recording(&mut coordinator);
        coordinator.start(template()).unwrap();
        coordinator.cancel().unwrap();
        assert!(coordinator.session().is_none());
        assert!(matches!(
            log.borrow().last(),
            Some(SessionEvent::SessionCancelled { .. })
        ));
    }

    #[test]
    fn noop_navigation_emits_nothing() {
        let mut coordinator = RoutineCoordinator::default();
        let log = recording(&mut coordinator);
        coordinator.start(template()).unwrap();
        let events = coordinator.go_to_previous().unwrap();
        assert!(events.is_empty());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn start_with_too_deep_template_keeps_previous() {
        let mut coordinator = RoutineCoordinator::new(0);
        let plain = RoutineTemplate::new("Plain", vec![Habit::task("x")]);
        coordinator.start(plain).unwrap();
        let err = coordinator.start(template()).unwrap_err();
        assert!(matches!(err, SessionError::BranchTooDeep { depth: 1, max: 0, .. }));
        assert_eq!(coordinator.session().unwrap().template().name, "Plain");
    }
}

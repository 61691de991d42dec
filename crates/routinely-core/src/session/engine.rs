//! Routine session engine.
//!
//! A session walks a live queue of habits seeded from one template. The
//! queue is owned by the session and grows when a conditional habit is
//! answered: the chosen option's habits are spliced in right after the
//! question (branch expansion). Nested questions expand lazily, one branch
//! per answer.
//!
//! ## Lifecycle
//!
//! ```text
//! start -> (complete | skip | go_to_previous | go_to)* -> finalize_complete | cancel
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = RoutineSession::start(template, DEFAULT_MAX_BRANCH_DEPTH)?;
//! session.complete_current(None, CompletionPayload::default())?;
//! session.complete_current(None, CompletionPayload::answer("opt-yes"))?;
//! session.finalize_complete()?;
//! ```
//!
//! Every command returns the events it caused. Commands that fail leave the
//! session untouched.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::completion::{CompletionPayload, HabitCompletion};
use crate::error::SessionError;
use crate::events::SessionEvent;
use crate::habit::Habit;
use crate::template::RoutineTemplate;

type Result<T> = std::result::Result<T, SessionError>;

/// A running (or finished) execution of one routine template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineSession {
    id: String,
    /// Copy of the originating template. Never mutated.
    template: RoutineTemplate,
    /// Live execution plan, distinct from `template.habits`.
    queue: Vec<Habit>,
    /// Index into `queue`; equal to `queue.len()` once the end is reached.
    cursor: usize,
    completions: Vec<HabitCompletion>,
    started_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    /// Highest progress reached through complete/skip.
    #[serde(default)]
    progress_mark: f64,
}

/// Read-only overview of a session, for status output and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub template_id: String,
    pub template_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub queue_len: usize,
    pub cursor: usize,
    pub completed: usize,
    pub skipped: usize,
    pub progress: f64,
    pub elapsed_secs: i64,
    pub tracked_duration_secs: u64,
}

impl RoutineSession {
    /// Start a session from `template`.
    ///
    /// The queue is seeded with the template's active habits. Fails with
    /// [`SessionError::BranchTooDeep`] when conditional habits nest deeper
    /// than `max_branch_depth`.
    pub fn start(template: RoutineTemplate, max_branch_depth: usize) -> Result<Self> {
        Self::start_at(template, max_branch_depth, Utc::now())
    }

    pub fn start_at(
        template: RoutineTemplate,
        max_branch_depth: usize,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        template.validate_branch_depth(max_branch_depth)?;
        let queue: Vec<Habit> = template.active_habits().cloned().collect();
        let session = Self {
            id: Uuid::new_v4().to_string(),
            template,
            queue,
            cursor: 0,
            completions: Vec::new(),
            started_at: now,
            completed_at: None,
            progress_mark: 0.0,
        };
        info!(
            session_id = %session.id,
            template_id = %session.template.id,
            queue_len = session.queue.len(),
            "routine session started"
        );
        Ok(session)
    }

    /// Event describing the session start.
    pub fn started_event(&self) -> SessionEvent {
        SessionEvent::SessionStarted {
            session_id: self.id.clone(),
            template_id: self.template.id.clone(),
            queue_len: self.queue.len(),
            at: self.started_at,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn template(&self) -> &RoutineTemplate {
        &self.template
    }

    pub fn queue(&self) -> &[Habit] {
        &self.queue
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn completions(&self) -> &[HabitCompletion] {
        &self.completions
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// The step at the cursor, or `None` once the queue is exhausted.
    pub fn current_habit(&self) -> Option<&Habit> {
        self.queue.get(self.cursor)
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    /// Steps from the cursor to the end of the queue, current one included.
    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.cursor)
    }

    /// True if any completion (done or skipped) was logged for the habit.
    pub fn is_habit_done(&self, habit_id: &str) -> bool {
        self.completions.iter().any(|c| c.habit_id == habit_id)
    }

    /// 0.0 .. 1.0 share of the queue that has been completed or skipped.
    ///
    /// Branch expansion grows the queue, so the raw ratio can drop after an
    /// answer; the reported value never goes below the best one reached.
    pub fn progress(&self) -> f64 {
        self.raw_progress().max(self.progress_mark)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Utc::now())
    }

    /// Time between start and `now`, or start and finalization if finished.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        let end = self.completed_at.unwrap_or(now);
        (end - self.started_at).max(Duration::zero())
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Sum of durations reported with non-skipped completions.
    pub fn tracked_duration_secs(&self) -> u64 {
        self.completions
            .iter()
            .filter(|c| !c.is_skipped)
            .filter_map(|c| c.duration_secs)
            .sum()
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary_at(Utc::now())
    }

    pub fn summary_at(&self, now: DateTime<Utc>) -> SessionSummary {
        let skipped = self.completions.iter().filter(|c| c.is_skipped).count();
        SessionSummary {
            session_id: self.id.clone(),
            template_id: self.template.id.clone(),
            template_name: self.template.name.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at,
            queue_len: self.queue.len(),
            cursor: self.cursor,
            completed: self.completions.len() - skipped,
            skipped,
            progress: self.progress(),
            elapsed_secs: self.elapsed_at(now).num_seconds(),
            tracked_duration_secs: self.tracked_duration_secs(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn complete_current(
        &mut self,
        duration_secs: Option<u64>,
        payload: CompletionPayload,
    ) -> Result<Vec<SessionEvent>> {
        self.complete_current_at(duration_secs, payload, Utc::now())
    }

    /// Complete the step at the cursor and advance.
    ///
    /// An [`CompletionPayload::Answer`] on a conditional habit with at least
    /// two options inserts the chosen option's habits directly after the
    /// cursor, so the cursor lands on the first of them.
    pub fn complete_current_at(
        &mut self,
        duration_secs: Option<u64>,
        payload: CompletionPayload,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionEvent>> {
        self.ensure_open()?;
        let index = self.cursor;
        let habit = self.queue.get(index).ok_or(SessionError::NoCurrentHabit)?;

        // Resolve everything before touching state.
        let (notes, selected_option_id, branch) = match payload {
            CompletionPayload::Plain(notes) => (notes, None, None),
            CompletionPayload::Skip => (None, None, None),
            CompletionPayload::Answer(option_id) => {
                if !habit.is_conditional() {
                    return Err(SessionError::NotConditional {
                        habit_id: habit.id.clone(),
                    });
                }
                let option = habit.option(&option_id).ok_or_else(|| SessionError::UnknownOption {
                    habit_id: habit.id.clone(),
                    option_id: option_id.clone(),
                })?;
                let branch = if habit.is_runnable_conditional() {
                    Some((option.id.clone(), option.habits.clone()))
                } else {
                    debug!(habit_id = %habit.id, "question has fewer than two options, not branching");
                    None
                };
                (Some(option.text.clone()), Some(option.id.clone()), branch)
            }
        };
        let habit_id = habit.id.clone();

        self.completions.push(HabitCompletion::completed(
            &habit_id,
            now,
            duration_secs,
            notes,
            selected_option_id,
        ));
        let mut events = vec![SessionEvent::HabitCompleted {
            habit_id: habit_id.clone(),
            index,
            at: now,
        }];

        if let Some((option_id, habits)) = branch {
            let inserted = habits.len();
            if inserted > 0 {
                self.queue.splice(index + 1..index + 1, habits);
                info!(
                    session_id = %self.id,
                    habit_id = %habit_id,
                    option_id = %option_id,
                    inserted,
                    queue_len = self.queue.len(),
                    "branch expanded"
                );
                events.push(SessionEvent::BranchExpanded {
                    habit_id,
                    option_id,
                    index,
                    inserted,
                    queue_len: self.queue.len(),
                    at: now,
                });
            }
        }

        events.push(self.advance(now));
        Ok(events)
    }

    pub fn skip_current(&mut self) -> Result<Vec<SessionEvent>> {
        self.skip_current_at(Utc::now())
    }

    /// Log the step at the cursor as skipped and advance. Skipping a question
    /// never pulls in any of its options.
    pub fn skip_current_at(&mut self, now: DateTime<Utc>) -> Result<Vec<SessionEvent>> {
        self.ensure_open()?;
        let index = self.cursor;
        let habit_id = self
            .current_habit()
            .map(|h| h.id.clone())
            .ok_or(SessionError::NoCurrentHabit)?;

        self.completions.push(HabitCompletion::skipped(&habit_id, now));
        debug!(session_id = %self.id, habit_id = %habit_id, "habit skipped");
        Ok(vec![
            SessionEvent::HabitSkipped {
                habit_id,
                index,
                at: now,
            },
            self.advance(now),
        ])
    }

    /// Step back one position. No-op at the first step. Completions are kept.
    pub fn go_to_previous(&mut self) -> Result<Option<SessionEvent>> {
        self.ensure_open()?;
        if self.cursor == 0 {
            return Ok(None);
        }
        Ok(self.move_cursor(self.cursor - 1))
    }

    /// Jump straight to `index` (step overview). Never re-triggers expansion.
    pub fn go_to(&mut self, index: usize) -> Result<Option<SessionEvent>> {
        self.ensure_open()?;
        if index >= self.queue.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.queue.len(),
            });
        }
        Ok(self.move_cursor(index))
    }

    pub fn finalize_complete(&mut self) -> Result<SessionEvent> {
        self.finalize_complete_at(Utc::now())
    }

    /// Mark the session finished. The cursor does not need to be at the end.
    pub fn finalize_complete_at(&mut self, now: DateTime<Utc>) -> Result<SessionEvent> {
        self.ensure_open()?;
        self.completed_at = Some(now);
        info!(
            session_id = %self.id,
            completions = self.completions.len(),
            remaining = self.remaining(),
            "routine session finished"
        );
        Ok(SessionEvent::SessionFinished {
            session_id: self.id.clone(),
            completions: self.completions.len(),
            at: now,
        })
    }

    /// Discard the session. Nothing of it survives.
    pub fn cancel(self) -> Result<SessionEvent> {
        self.ensure_open()?;
        info!(session_id = %self.id, "routine session cancelled");
        Ok(SessionEvent::SessionCancelled {
            session_id: self.id,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<()> {
        if self.completed_at.is_some() {
            return Err(SessionError::AlreadyFinalized);
        }
        Ok(())
    }

    fn raw_progress(&self) -> f64 {
        if self.queue.is_empty() {
            return 0.0;
        }
        (self.completions.len() as f64 / self.queue.len() as f64).min(1.0)
    }

    fn advance(&mut self, now: DateTime<Utc>) -> SessionEvent {
        let from = self.cursor;
        self.cursor += 1;
        self.progress_mark = self.progress();
        SessionEvent::CursorMoved {
            from,
            to: self.cursor,
            at: now,
        }
    }

    fn move_cursor(&mut self, to: usize) -> Option<SessionEvent> {
        if to == self.cursor {
            return None;
        }
        let from = self.cursor;
        self.cursor = to;
        debug!(session_id = %self.id, from, to, "cursor moved");
        Some(SessionEvent::CursorMoved {
            from,
            to,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::ConditionalOption;
    use crate::template::DEFAULT_MAX_BRANCH_DEPTH;

    fn ids(session: &RoutineSession) -> Vec<&str> {
        session.queue().iter().map(|h| h.id.as_str()).collect()
    }

    fn plain_template() -> RoutineTemplate {
        RoutineTemplate::new(
            "Plain",
            vec![
                Habit::task("H1").with_id("H1"),
                Habit::task("H2").with_id("H2"),
                Habit::task("H3").with_id("H3"),
            ],
        )
    }

    fn yes_no_template() -> RoutineTemplate {
        RoutineTemplate::new(
            "Branching",
            vec![Habit::conditional(
                "H1",
                "Going outside?",
                vec![
                    ConditionalOption::new(
                        "Yes",
                        vec![Habit::task("H2").with_id("H2"), Habit::task("H3").with_id("H3")],
                    )
                    .with_id("yes"),
                    ConditionalOption::new("No", vec![]).with_id("no"),
                ],
            )
            .with_id("H1")],
        )
    }

    fn start(template: RoutineTemplate) -> RoutineSession {
        RoutineSession::start(template, DEFAULT_MAX_BRANCH_DEPTH).unwrap()
    }

    #[test]
    fn start_seeds_queue_from_active_habits() {
        let mut template = plain_template();
        template.habits[1].is_active = false;
        let session = start(template);
        assert_eq!(ids(&session), vec!["H1", "H3"]);
        assert_eq!(session.cursor(), 0);
        assert!(session.completions().is_empty());
        assert!(!session.is_completed());
    }

    #[test]
    fn completing_every_step_reaches_the_end() {
        let mut session = start(plain_template());
        for _ in 0..3 {
            session.complete_current(None, CompletionPayload::default()).unwrap();
        }
        assert_eq!(session.completions().len(), 3);
        assert_eq!(session.cursor(), 3);
        assert!(session.current_habit().is_none());
        assert!(session.is_at_end());
        assert_eq!(session.progress(), 1.0);
    }

    #[test]
    fn complete_past_end_fails() {
        let mut session = start(RoutineTemplate::new("One", vec![Habit::task("only")]));
        session.complete_current(None, CompletionPayload::default()).unwrap();
        assert_eq!(
            session.complete_current(None, CompletionPayload::default()),
            Err(SessionError::NoCurrentHabit)
        );
        assert_eq!(session.skip_current(), Err(SessionError::NoCurrentHabit));
        assert_eq!(session.completions().len(), 1);
    }

    #[test]
    fn answering_yes_expands_branch() {
        let mut session = start(yes_no_template());
        let events = session
            .complete_current(None, CompletionPayload::answer("yes"))
            .unwrap();
        assert_eq!(ids(&session), vec!["H1", "H2", "H3"]);
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.current_habit().unwrap().id, "H2");
        assert!(events.iter().any(SessionEvent::changes_queue));

        let completion = &session.completions()[0];
        assert_eq!(completion.selected_option_id.as_deref(), Some("yes"));
        assert_eq!(completion.notes.as_deref(), Some("Yes"));
        assert!(!completion.is_skipped);
    }

    #[test]
    fn answering_no_leaves_queue_alone() {
        let mut session = start(yes_no_template());
        let events = session
            .complete_current(None, CompletionPayload::answer("no"))
            .unwrap();
        assert_eq!(ids(&session), vec!["H1"]);
        assert_eq!(session.cursor(), 1);
        assert!(session.current_habit().is_none());
        assert_eq!(session.progress(), 1.0);
        assert!(!events.iter().any(SessionEvent::changes_queue));
    }

    #[test]
    fn expansion_keeps_tail_after_inserted_habits() {
        let mut template = yes_no_template();
        template.habits.push(Habit::task("Tail").with_id("T"));
        let mut session = start(template);
        session.complete_current(None, CompletionPayload::answer("yes")).unwrap();
        assert_eq!(ids(&session), vec!["H1", "H2", "H3", "T"]);
    }

    #[test]
    fn skip_payload_on_question_does_not_expand() {
        let mut session = start(yes_no_template());
        session.complete_current(None, CompletionPayload::Skip).unwrap();
        assert_eq!(ids(&session), vec!["H1"]);
        assert!(!session.completions()[0].is_skipped);
    }

    #[test]
    fn skipping_question_does_not_expand() {
        let mut session = start(yes_no_template());
        let events = session.skip_current().unwrap();
        assert_eq!(session.queue().len(), 1);
        assert!(session.completions()[0].is_skipped);
        assert!(matches!(events[0], SessionEvent::HabitSkipped { .. }));
    }

    #[test]
    fn unknown_option_fails_without_mutation() {
        let mut session = start(yes_no_template());
        let err = session
            .complete_current(None, CompletionPayload::answer("maybe"))
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::UnknownOption {
                habit_id: "H1".into(),
                option_id: "maybe".into(),
            }
        );
        assert_eq!(session.cursor(), 0);
        assert!(session.completions().is_empty());
    }

    #[test]
    fn answer_on_plain_habit_is_rejected() {
        let mut session = start(plain_template());
        assert_eq!(
            session.complete_current(None, CompletionPayload::answer("yes")),
            Err(SessionError::NotConditional {
                habit_id: "H1".into()
            })
        );
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn single_option_question_completes_without_branching() {
        let template = RoutineTemplate::new(
            "Lonely",
            vec![Habit::conditional(
                "Q",
                "Only choice?",
                vec![ConditionalOption::new("Sure", vec![Habit::task("X")]).with_id("sure")],
            )],
        );
        let mut session = start(template);
        session.complete_current(None, CompletionPayload::answer("sure")).unwrap();
        assert_eq!(session.queue().len(), 1);
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn nested_question_expands_lazily() {
        let inner = Habit::conditional(
            "Inner",
            "Tired?",
            vec![
                ConditionalOption::new("Yes", vec![Habit::task("Nap").with_id("nap")])
                    .with_id("tired"),
                ConditionalOption::new("No", vec![]).with_id("fresh"),
            ],
        )
        .with_id("inner");
        let outer = Habit::conditional(
            "Outer",
            "Home?",
            vec![
                ConditionalOption::new("Yes", vec![inner]).with_id("home"),
                ConditionalOption::new("No", vec![]).with_id("away"),
            ],
        )
        .with_id("outer");
        let mut session = start(RoutineTemplate::new("Nested", vec![outer]));

        session.complete_current(None, CompletionPayload::answer("home")).unwrap();
        assert_eq!(ids(&session), vec!["outer", "inner"]);

        session.complete_current(None, CompletionPayload::answer("tired")).unwrap();
        assert_eq!(ids(&session), vec!["outer", "inner", "nap"]);
        assert_eq!(session.current_habit().unwrap().id, "nap");
    }

    #[test]
    fn too_deep_template_is_rejected_at_start() {
        let mut habit = Habit::task("leaf");
        for _ in 0..3 {
            habit = Habit::conditional(
                "q",
                "?",
                vec![
                    ConditionalOption::new("a", vec![habit]),
                    ConditionalOption::new("b", vec![]),
                ],
            );
        }
        let template = RoutineTemplate::new("Deep", vec![habit]);
        let err = RoutineSession::start(template, DEFAULT_MAX_BRANCH_DEPTH).unwrap_err();
        assert!(matches!(err, SessionError::BranchTooDeep { depth: 3, max: 2, .. }));
    }

    #[test]
    fn go_to_previous_at_start_is_noop() {
        let mut session = start(plain_template());
        assert_eq!(session.go_to_previous().unwrap(), None);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn revisiting_appends_a_second_completion() {
        let mut session = start(plain_template());
        session.complete_current(Some(30), CompletionPayload::default()).unwrap();
        assert!(session.go_to_previous().unwrap().is_some());
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.completions().len(), 1);

        session.complete_current(Some(45), CompletionPayload::notes("again")).unwrap();
        let for_h1: Vec<_> = session
            .completions()
            .iter()
            .filter(|c| c.habit_id == "H1")
            .collect();
        assert_eq!(for_h1.len(), 2);
        assert!(session.is_habit_done("H1"));
        assert!(!session.is_habit_done("H2"));
        assert_eq!(session.tracked_duration_secs(), 75);
    }

    #[test]
    fn re_answering_revisited_question_expands_again() {
        let mut session = start(yes_no_template());
        session
            .complete_current(None, CompletionPayload::answer("yes"))
            .unwrap();
        assert_eq!(ids(&session), vec!["H1", "H2", "H3"]);

        session.go_to(0).unwrap();
        let events = session
            .complete_current(None, CompletionPayload::answer("yes"))
            .unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::BranchExpanded { inserted: 2, .. })));
        assert_eq!(ids(&session), vec!["H1", "H2", "H3", "H2", "H3"]);
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.completions().len(), 2);
    }

    #[test]
    fn go_to_out_of_range_mutates_nothing() {
        let mut session = start(plain_template());
        session.go_to(2).unwrap();
        assert_eq!(
            session.go_to(3),
            Err(SessionError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(session.cursor(), 2);
    }

    #[test]
    fn navigation_does_not_change_progress() {
        let mut session = start(plain_template());
        session.complete_current(None, CompletionPayload::default()).unwrap();
        let before = session.progress();
        session.go_to(2).unwrap();
        session.go_to_previous().unwrap();
        assert_eq!(session.progress(), before);
    }

    #[test]
    fn progress_does_not_drop_after_expansion() {
        let mut template = plain_template();
        template.habits.push(
            Habit::conditional(
                "Q",
                "More?",
                vec![
                    ConditionalOption::new(
                        "Yes",
                        vec![Habit::task("a"), Habit::task("b"), Habit::task("c")],
                    )
                    .with_id("yes"),
                    ConditionalOption::new("No", vec![]).with_id("no"),
                ],
            )
            .with_id("Q"),
        );
        let mut session = start(template);
        for _ in 0..3 {
            session.complete_current(None, CompletionPayload::default()).unwrap();
        }
        let before = session.progress();
        assert_eq!(before, 0.75);
        session.complete_current(None, CompletionPayload::answer("yes")).unwrap();
        assert_eq!(session.queue().len(), 7);
        assert!(session.progress() >= before);
    }

    #[test]
    fn empty_queue_has_zero_progress() {
        let template = RoutineTemplate::new("Empty", vec![Habit::task("off").inactive()]);
        let session = start(template);
        assert!(session.current_habit().is_none());
        assert_eq!(session.progress(), 0.0);
    }

    #[test]
    fn finalize_twice_fails() {
        let mut session = start(plain_template());
        let at = session.started_at() + Duration::minutes(5);
        session.finalize_complete_at(at).unwrap();
        assert_eq!(session.completed_at(), Some(at));
        assert_eq!(
            session.finalize_complete_at(at + Duration::minutes(1)),
            Err(SessionError::AlreadyFinalized)
        );
        assert_eq!(session.completed_at(), Some(at));
        assert_eq!(session.elapsed(), Duration::minutes(5));
    }

    #[test]
    fn finalized_session_rejects_commands() {
        let mut session = start(plain_template());
        session.finalize_complete().unwrap();
        assert_eq!(
            session.complete_current(None, CompletionPayload::default()),
            Err(SessionError::AlreadyFinalized)
        );
        assert_eq!(session.skip_current(), Err(SessionError::AlreadyFinalized));
        assert_eq!(session.go_to(0), Err(SessionError::AlreadyFinalized));
        assert_eq!(session.cancel(), Err(SessionError::AlreadyFinalized));
    }

    #[test]
    fn elapsed_runs_until_finalized() {
        let now = Utc::now();
        let session = RoutineSession::start_at(plain_template(), 2, now).unwrap();
        assert_eq!(session.elapsed_at(now + Duration::seconds(90)), Duration::seconds(90));
        assert_eq!(session.elapsed_at(now - Duration::seconds(5)), Duration::zero());
    }

    #[test]
    fn template_edits_do_not_reach_running_session() {
        let mut template = plain_template();
        let session = start(template.clone());
        template.habits.clear();
        assert_eq!(session.queue().len(), 3);
        assert_eq!(session.template().habits.len(), 3);
    }

    #[test]
    fn summary_counts_done_and_skipped() {
        let mut session = start(plain_template());
        session.complete_current(Some(60), CompletionPayload::default()).unwrap();
        session.skip_current().unwrap();
        let summary = session.summary();
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.cursor, 2);
        assert_eq!(summary.tracked_duration_secs, 60);
    }

    #[test]
    fn session_json_roundtrip_keeps_queue_and_cursor() {
        let mut session = start(yes_no_template());
        session.complete_current(None, CompletionPayload::answer("yes")).unwrap();
        let json = serde_json::to_string(&session).unwrap();
        let restored: RoutineSession = serde_json::from_str(&json).unwrap();
        assert_eq!(ids(&restored), vec!["H1", "H2", "H3"]);
        assert_eq!(restored.cursor(), 1);
        assert_eq!(restored.progress(), session.progress());
    }
}

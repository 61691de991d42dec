//! Property tests for queue, cursor and progress behavior.

use proptest::prelude::*;
use routinely_core::{
    CompletionPayload, ConditionalOption, Habit, RoutineSession, RoutineTemplate, SessionError,
    DEFAULT_MAX_BRANCH_DEPTH,
};

#[derive(Debug, Clone)]
enum Action {
    Complete,
    Answer(usize),
    Skip,
    Previous,
    GoTo(usize),
}

fn habit_strategy() -> impl Strategy<Value = Habit> {
    let leaf = "[a-z]{1,8}".prop_map(Habit::task);
    leaf.prop_recursive(2, 24, 4, |inner| {
        prop::collection::vec(prop::collection::vec(inner, 0..4), 0..4).prop_map(|options| {
            let options = options
                .into_iter()
                .enumerate()
                .map(|(i, habits)| ConditionalOption::new(format!("option {i}"), habits))
                .collect();
            Habit::conditional("question", "Which way?", options)
        })
    })
}

fn template_strategy() -> impl Strategy<Value = RoutineTemplate> {
    prop::collection::vec(habit_strategy(), 0..6)
        .prop_map(|habits| RoutineTemplate::new("generated", habits))
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => Just(Action::Complete),
        3 => (0usize..4).prop_map(Action::Answer),
        2 => Just(Action::Skip),
        1 => Just(Action::Previous),
        1 => (0usize..12).prop_map(Action::GoTo),
    ]
}

proptest! {
    #[test]
    fn progress_stays_in_range_and_never_drops(
        template in template_strategy(),
        actions in prop::collection::vec(action_strategy(), 0..40),
    ) {
        let mut session = RoutineSession::start(template, DEFAULT_MAX_BRANCH_DEPTH).unwrap();
        let mut last = session.progress();
        prop_assert!((0.0..=1.0).contains(&last));

        for action in actions {
            let before_len = session.queue().len();
            let before_cursor = session.cursor();
            let current = session.current_habit().cloned();

            match action {
                Action::Complete => {
                    let result = session.complete_current(None, CompletionPayload::default());
                    if current.is_none() {
                        prop_assert_eq!(result, Err(SessionError::NoCurrentHabit));
                    } else {
                        prop_assert_eq!(session.queue().len(), before_len);
                        prop_assert!(session.progress() >= last);
                    }
                }
                Action::Answer(choice) => {
                    let Some(habit) = current.filter(|h| !h.options().is_empty()) else {
                        continue;
                    };
                    let option = &habit.options()[choice % habit.options().len()];
                    session
                        .complete_current(None, CompletionPayload::answer(option.id.clone()))
                        .unwrap();

                    let expected_growth = if habit.is_runnable_conditional() {
                        option.habits.len()
                    } else {
                        0
                    };
                    prop_assert_eq!(session.queue().len(), before_len + expected_growth);
                    let inserted: Vec<&str> = session.queue()
                        [before_cursor + 1..before_cursor + 1 + expected_growth]
                        .iter()
                        .map(|h| h.id.as_str())
                        .collect();
                    let expected: Vec<&str> = option.habits[..expected_growth]
                        .iter()
                        .map(|h| h.id.as_str())
                        .collect();
                    prop_assert_eq!(inserted, expected);
                    prop_assert_eq!(session.cursor(), before_cursor + 1);
                    prop_assert!(session.progress() >= last);
                }
                Action::Skip => {
                    let result = session.skip_current();
                    if current.is_none() {
                        prop_assert_eq!(result, Err(SessionError::NoCurrentHabit));
                    } else {
                        prop_assert_eq!(session.queue().len(), before_len);
                        prop_assert!(session.progress() >= last);
                    }
                }
                Action::Previous => {
                    session.go_to_previous().unwrap();
                    prop_assert_eq!(session.cursor(), before_cursor.saturating_sub(1));
                    prop_assert_eq!(session.progress(), last);
                }
                Action::GoTo(index) => {
                    let result = session.go_to(index);
                    if index >= before_len {
                        prop_assert_eq!(
                            result,
                            Err(SessionError::IndexOutOfRange { index, len: before_len })
                        );
                        prop_assert_eq!(session.cursor(), before_cursor);
                    } else {
                        prop_assert_eq!(session.cursor(), index);
                    }
                    prop_assert_eq!(session.progress(), last);
                }
            }

            let now = session.progress();
            prop_assert!((0.0..=1.0).contains(&now));
            last = now;
        }
    }

    #[test]
    fn finalize_sets_completed_at_once(template in template_strategy()) {
        let mut session = RoutineSession::start(template, DEFAULT_MAX_BRANCH_DEPTH).unwrap();
        session.finalize_complete().unwrap();
        let first = session.completed_at();
        prop_assert!(first.is_some());
        prop_assert_eq!(session.finalize_complete(), Err(SessionError::AlreadyFinalized));
        prop_assert_eq!(session.completed_at(), first);
    }
}

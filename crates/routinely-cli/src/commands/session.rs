//! Routine session commands for CLI.
//!
//! The active session is persisted between invocations, so each command
//! loads it, applies one mutation through the coordinator and saves it back.

use clap::Subcommand;
use routinely_core::{
    parse_legacy_notes, select, CompletionPayload, Config, HabitKind, RoutineCoordinator,
    RoutineSession, SessionError, SessionEvent, SessionStore,
};
use tracing::info;

use super::context::ContextArgs;
use super::load_catalog;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session from a template, or from the best match for the current context
    Start {
        /// Template id or name; omit to select by context
        template: Option<String>,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Print the active session
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Complete the current habit
    Complete {
        /// Time spent on the habit, in seconds
        #[arg(long)]
        duration: Option<u64>,
        /// Free-form notes ("Selected: <option>" answers a question)
        #[arg(long, conflicts_with = "answer")]
        notes: Option<String>,
        /// Answer a conditional habit by option id or text
        #[arg(long)]
        answer: Option<String>,
    },
    /// Skip the current habit
    Skip,
    /// Move back one habit
    Prev,
    /// Move to a queue position
    Goto {
        /// Zero-based queue index
        index: usize,
    },
    /// Finish the session and record it in history
    Finish,
    /// Discard the active session
    Cancel,
    /// List finished sessions
    History {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_coordinator(
    store: &SessionStore,
    config: &Config,
) -> Result<RoutineCoordinator, Box<dyn std::error::Error>> {
    let mut coordinator = RoutineCoordinator::new(config.session.max_branch_depth);
    if let Some(session) = store.load_active()? {
        coordinator = coordinator.with_session(session);
    }
    coordinator.subscribe(|event: &SessionEvent| {
        info!(event = ?event, "session event");
    });
    Ok(coordinator)
}

fn save_coordinator(
    store: &SessionStore,
    coordinator: &RoutineCoordinator,
) -> Result<(), Box<dyn std::error::Error>> {
    match coordinator.session() {
        Some(session) => store.save_active(session)?,
        None => store.clear_active()?,
    }
    Ok(())
}

fn print_events(events: &[SessionEvent]) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

fn payload_for(
    coordinator: &RoutineCoordinator,
    notes: Option<String>,
    answer: Option<String>,
) -> Result<CompletionPayload, SessionError> {
    let session = coordinator.session().ok_or(SessionError::NoActiveSession)?;
    let habit = session.current_habit().ok_or(SessionError::NoCurrentHabit)?;

    match answer {
        Some(answer) => {
            let option_id = habit
                .option(&answer)
                .or_else(|| habit.option_by_text(&answer))
                .map(|o| o.id.clone())
                .unwrap_or(answer);
            Ok(CompletionPayload::answer(option_id))
        }
        None => Ok(parse_legacy_notes(habit, notes.as_deref())),
    }
}

fn print_status(session: &RoutineSession) {
    let summary = session.summary();
    println!(
        "{} ({}) {:.0}% [{}/{}]",
        summary.template_name,
        summary.session_id,
        summary.progress * 100.0,
        summary.cursor.min(summary.queue_len),
        summary.queue_len
    );
    for (index, habit) in session.queue().iter().enumerate() {
        let marker = if index == session.cursor() {
            ">"
        } else if session.is_habit_done(&habit.id) {
            "x"
        } else {
            " "
        };
        println!("{marker} {index:>2} {} [{}]", habit.name, habit.kind.name());
    }
    if let Some(habit) = session.current_habit() {
        if let HabitKind::Conditional { question, options } = &habit.kind {
            println!("? {question}");
            for option in options {
                println!("  - {} ({})", option.text, option.id);
            }
        }
    } else {
        println!("All habits done. Use 'session finish' to record the session.");
    }
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = SessionStore::open()?;
    let mut coordinator = load_coordinator(&store, &config)?;

    match action {
        SessionAction::Start { template, context } => {
            let catalog = load_catalog(&config)?;
            let template = match template {
                Some(key) => catalog.find_template(&key)?.clone(),
                None => {
                    let ctx = context.resolve(&config, &catalog)?;
                    select(&ctx, &catalog.templates)
                        .cloned()
                        .ok_or("no template matches the current context")?
                }
            };
            let events = coordinator.start(template)?;
            print_events(&events)?;
        }
        SessionAction::Status { json } => match coordinator.session() {
            Some(session) if json => {
                println!("{}", serde_json::to_string_pretty(&session.summary())?)
            }
            Some(session) => print_status(session),
            None if json => println!("null"),
            None => println!("No active session."),
        },
        SessionAction::Complete {
            duration,
            notes,
            answer,
        } => {
            let payload = payload_for(&coordinator, notes, answer)?;
            let events = coordinator.complete_current(duration, payload)?;
            print_events(&events)?;
        }
        SessionAction::Skip => {
            let events = coordinator.skip_current()?;
            print_events(&events)?;
        }
        SessionAction::Prev => {
            let events = coordinator.go_to_previous()?;
            print_events(&events)?;
        }
        SessionAction::Goto { index } => {
            let events = coordinator.go_to(index)?;
            print_events(&events)?;
        }
        SessionAction::Finish => {
            let session = coordinator.finalize_complete()?;
            store.append_history(&session.summary())?;
            println!("{}", serde_json::to_string_pretty(&session.summary())?);
        }
        SessionAction::Cancel => {
            coordinator.cancel()?;
            println!("Session cancelled.");
        }
        SessionAction::History { json } => {
            let history = store.history()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("No finished sessions.");
            } else {
                for summary in history {
                    println!(
                        "{}  {:<24} {}/{} done, {} skipped, {}s tracked",
                        summary.started_at.format("%Y-%m-%d %H:%M"),
                        summary.template_name,
                        summary.completed,
                        summary.queue_len,
                        summary.skipped,
                        summary.tracked_duration_secs
                    );
                }
            }
            return Ok(());
        }
    }

    save_coordinator(&store, &coordinator)?;
    Ok(())
}

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "routinely", version, about = "Routinely CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Routine template catalog
    Template {
        #[command(subcommand)]
        action: commands::template::TemplateAction,
    },
    /// Print the resolved context (time slot, day category, location)
    Context {
        #[command(flatten)]
        args: commands::context::ContextArgs,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Pick the template that fits the current context
    Select {
        #[command(flatten)]
        args: commands::context::ContextArgs,
        /// List every matching template, best first
        #[arg(long)]
        all: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a routine session
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ROUTINELY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Template { action } => commands::template::run(action),
        Commands::Context { args, json } => commands::context::run_context(args, json),
        Commands::Select { args, all, json } => commands::context::run_select(args, all, json),
        Commands::Session { action } => commands::session::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

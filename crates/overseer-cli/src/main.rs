use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use overseer_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "overseer", version, about = "Author Windows Assigned Access kiosk policies")]
struct Cli {
    /// Log filter, e.g. "debug" or "overseer_core=trace" (defaults to the configured level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a session file, optionally from a preset
    New(commands::session::NewArgs),
    /// Print a summary of a session
    Show {
        /// Session file
        file: std::path::PathBuf,
    },
    /// Check a session against the policy rules
    Validate {
        /// Session file
        file: std::path::PathBuf,
    },
    /// Print the policy document a session would export
    Preview {
        /// Session file
        file: std::path::PathBuf,
    },
    /// Write the policy document and shortcut manifest
    Export(commands::session::ExportArgs),
    /// Create a session file from an existing policy document
    Import(commands::session::ImportArgs),
    /// Print the shortcut manifest as JSON
    Shortcuts {
        /// Session file
        file: std::path::PathBuf,
    },
    /// Switch the lockdown mode
    Mode(commands::session::ModeArgs),
    /// Bind the account the profile applies to
    Account(commands::session::AccountArgs),
    /// Allowed application management
    App {
        #[command(subcommand)]
        action: commands::app::AppAction,
    },
    /// Start and taskbar pin management
    Pin {
        #[command(subcommand)]
        action: commands::pin::PinAction,
    },
    /// Built-in presets
    Preset {
        #[command(subcommand)]
        action: commands::preset::PresetAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(level: Option<&str>) {
    let level = level
        .map(str::to_string)
        .unwrap_or_else(|| Config::load_or_default().logging.level);
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::New(args) => commands::session::new(args),
        Commands::Show { file } => commands::session::show(&file),
        Commands::Validate { file } => commands::session::validate(&file),
        Commands::Preview { file } => commands::session::preview(&file),
        Commands::Export(args) => commands::session::export(args),
        Commands::Import(args) => commands::session::import(args),
        Commands::Shortcuts { file } => commands::session::shortcuts(&file),
        Commands::Mode(args) => commands::session::mode(args),
        Commands::Account(args) => commands::session::account(args),
        Commands::App { action } => commands::app::run(action),
        Commands::Pin { action } => commands::pin::run(action),
        Commands::Preset { action } => commands::preset::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

//! # Lounge Desk Library
//!
//! Core library for the Lounge operator console.
//! This is the main entry point that loads configuration and runs the shell.
//!
//! ## Module Organization
//! ```text
//! lounge_desk_lib/
//! ├── lib.rs            ◄─── You are here (startup & run)
//! ├── cli.rs            ◄─── Process flags and per-line command grammar
//! ├── shell.rs          ◄─── Prompt loop and dispatch
//! ├── output.rs         ◄─── Table / JSON rendering
//! ├── state/
//! │   ├── mod.rs        ◄─── State type exports
//! │   ├── visitors.rs   ◄─── Visitor book (live + history)
//! │   ├── tariffs.rs    ◄─── Tariff catalogue
//! │   ├── statistics.rs ◄─── Remembered chart filter
//! │   └── config.rs     ◄─── Configuration file and env overrides
//! ├── commands/
//! │   ├── mod.rs        ◄─── Command exports
//! │   ├── visitor.rs    ◄─── Check-in, edit, pause, remove
//! │   ├── day.rs        ◄─── Payment and day close
//! │   ├── tariff.rs     ◄─── Tariff CRUD
//! │   ├── statistics.rs ◄─── Daily bar chart
//! │   └── config.rs     ◄─── Configuration view
//! └── error.rs          ◄─── API error type for commands
//! ```
//!
//! ## State Management (Multiple State Types)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐   │
//! │  │  VisitorsState   │ │  TariffsState    │ │  ConfigState         │   │
//! │  │                  │ │                  │ │                      │   │
//! │  │  • Live visitors │ │  • Tariffs       │ │  • Venue name        │   │
//! │  │  • Pending pay   │ │  • Default id    │ │  • Currency          │   │
//! │  │  • History       │ │                  │ │  • UTC offset        │   │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘   │
//! │                                                                         │
//! │  Each command takes only the state it needs.                           │
//! │  Lock order: tariffs before visitors.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod shell;
pub mod state;

use std::io::{self, IsTerminal};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::ApiError;
use shell::Shell;
use state::ConfigState;

/// Runs the console until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Console Startup                                   │
/// │                                                                         │
/// │  1. Parse Flags ──────────────────────────────────────────────────────► │
/// │     • --config, --output                                                │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: WARN, can be overridden with RUST_LOG                    │
/// │                                                                         │
/// │  3. Load Configuration ───────────────────────────────────────────────► │
/// │     • --config / LOUNGE_CONFIG / platform config dir / defaults         │
/// │     • LOUNGE_* environment overrides                                    │
/// │                                                                         │
/// │  4. Initialize State Objects ─────────────────────────────────────────► │
/// │     • TariffsState from configured tariffs                              │
/// │     • Empty VisitorsState and StatisticsState                           │
/// │                                                                         │
/// │  5. Read Lines ───────────────────────────────────────────────────────► │
/// │     • Prompt only when stdin is a terminal                              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> Result<(), ApiError> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ConfigState::load(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        config.output = output;
    }
    debug!(?config, "Configuration loaded");

    let shell = Shell::new(config)?;
    info!(venue = %shell.config().venue_name, "Desk open");

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    shell.run(stdin.lock(), io::stdout().lock(), interactive)?;

    info!("Desk closed");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so stdout carries only command output. The prompt
/// stays quiet by default; `RUST_LOG=lounge=debug` shows every command.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

//! # Lounge Desk Entry Point
//!
//! This is the main entry point for the operator console.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lounge Desk                                      │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Operator Terminal                           │  │
//! │  │   lounge> add Franz        lounge> pay --all                     │  │
//! │  │   lounge> pause 1          lounge> close-day                     │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    Rust Backend (this crate)                     │  │
//! │  │                                                                  │  │
//! │  │  main.rs ────► Calls lib.rs, maps failure to exit code 1         │  │
//! │  │  lib.rs ─────► Logging, config, state, shell loop                │  │
//! │  │  shell.rs ───► One clap parse per line                           │  │
//! │  │  commands/ ──► add_visitor, quote_payment, close_day, ...        │  │
//! │  │  state/ ─────► VisitorsState, TariffsState, ConfigState          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  lounge-core (pure, in memory)                   │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Parse flags
//! 2. Initialize tracing (logging)
//! 3. Load configuration
//! 4. Create state objects
//! 5. Run the prompt

fn main() {
    // The actual setup is in lib.rs for better testability
    if let Err(err) = lounge_desk_lib::run() {
        eprintln!("lounge-desk: {}", err.message);
        std::process::exit(1);
    }
}

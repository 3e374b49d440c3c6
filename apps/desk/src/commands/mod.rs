//! # Console Commands
//!
//! One function per operator action. The shell parses a line, picks the
//! function and hands it exactly the state it needs.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports)
//! ├── visitor.rs     ◄─── Check-in, edit, remove, pause/resume, listing
//! ├── day.rs         ◄─── Pay selected, confirm/cancel, close day, history
//! ├── tariff.rs      ◄─── Tariff catalogue
//! ├── statistics.rs  ◄─── Daily bar chart over history
//! └── config.rs      ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lounge> pay 1 2                                                        │
//! │         │                                                               │
//! │         │ (clap parse)                                                  │
//! │         ▼                                                               │
//! │  fn quote_payment(                                                      │
//! │      tariffs: &TariffsState,   ◄── only the state it needs              │
//! │      visitors: &VisitorsState,                                          │
//! │      ids: &[u64],              ◄── from the parsed line                 │
//! │      now: DateTime<Utc>,       ◄── the shell's clock                    │
//! │  ) -> Result<Settlement, ApiError>                                      │
//! │         │                                                               │
//! │         │ (table or JSON)                                               │
//! │         ▼                                                               │
//! │  stdout                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands never read the clock themselves; `now` comes from the shell so
//! tests can replay a whole evening with fixed timestamps.

pub mod config;
pub mod day;
pub mod statistics;
pub mod tariff;
pub mod visitor;

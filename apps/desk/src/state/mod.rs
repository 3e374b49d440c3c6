//! # State Module
//!
//! Manages application state for the operator console.
//!
//! Each command takes only the state it needs, the same way a command
//! handler would receive injected state in a desktop shell:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌───────────────┐ ┌───────────────┐ ┌───────────────┐ ┌─────────────┐ │
//! │  │ VisitorsState │ │ TariffsState  │ │StatisticsState│ │ ConfigState │ │
//! │  │               │ │               │ │               │ │             │ │
//! │  │  Arc<Mutex<   │ │  Arc<Mutex<   │ │  Mutex<       │ │  venue      │ │
//! │  │  VisitorBook  │ │  TariffBook   │ │  Statistics-  │ │  currency   │ │
//! │  │  >>           │ │  >>           │ │  Query>       │ │  offset     │ │
//! │  └───────────────┘ └───────────────┘ └───────────────┘ └─────────────┘ │
//! │                                                                         │
//! │  LOCK ORDER: tariffs before visitors whenever both are needed.         │
//! │  ConfigState is read-only after initialization.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod statistics;
mod tariffs;
mod visitors;

pub use config::{default_config_path, ConfigError, ConfigState, SymbolPosition, TariffSeed};
pub use statistics::StatisticsState;
pub use tariffs::TariffsState;
pub use visitors::VisitorsState;

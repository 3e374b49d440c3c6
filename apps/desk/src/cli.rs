//! Clap derive structures for the console.
//!
//! Two parsers live here: [`Cli`] for the process flags, and [`ShellLine`]
//! for each line the operator types at the prompt.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lounge_core::Indicator;
use serde::{Deserialize, Serialize};

// ── Process flags ────────────────────────────────────────────────────

/// lounge-desk -- front desk of a pay-per-time venue
#[derive(Debug, Parser)]
#[command(
    name = "lounge-desk",
    version,
    about = "Check visitors in, bill them by the minute, and close the day"
)]
pub struct Cli {
    /// Output format (overrides the config file)
    #[arg(long, short = 'o')]
    pub output: Option<OutputFormat>,

    /// Config file path
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rounded text tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

// ── Shell lines ──────────────────────────────────────────────────────

/// One operator command.
#[derive(Debug, Parser)]
#[command(
    name = "",
    no_binary_name = true,
    disable_version_flag = true,
    subcommand_required = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShellCommand {
    /// Check a visitor in (default tariff unless --tariff is given)
    Add(AddArgs),

    /// Change a visitor's name, tariff or discount
    Edit(EditArgs),

    /// Remove visitors
    #[command(alias = "delete")]
    Rm {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },

    /// Pause a running visitor or resume a paused one
    #[command(alias = "resume")]
    Pause { id: u64 },

    /// Show live visitors with their time and cost so far
    #[command(alias = "list")]
    Ls,

    /// Price the selected visitors and wait for confirm/cancel
    Pay {
        ids: Vec<u64>,

        /// Select every unsettled visitor
        #[arg(long, short = 'a', conflicts_with = "ids")]
        all: bool,
    },

    /// Mark the pending payment as paid
    Confirm,

    /// Discard the pending payment
    Cancel,

    /// Archive all visitors into history (everyone must have paid)
    CloseDay,

    /// Show who still has to pay before the day can close
    #[command(alias = "status")]
    Day,

    /// Show archived visitors
    History,

    /// Show the tariff catalogue
    Tariffs,

    /// Manage tariffs
    Tariff {
        #[command(subcommand)]
        command: TariffCommand,
    },

    /// Daily bar chart over history
    Stats(StatsArgs),

    /// Show the active configuration
    Config,

    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Visitor name; several words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,

    /// Tariff id
    #[arg(long, short = 't')]
    pub tariff: Option<u32>,

    /// Discount in percent
    #[arg(long, short = 'd')]
    pub discount: Option<u8>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: u64,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 't')]
    pub tariff: Option<u32>,

    #[arg(long, short = 'd')]
    pub discount: Option<u8>,
}

#[derive(Debug, Subcommand)]
pub enum TariffCommand {
    /// Create a tariff: per-minute with --rate, flat otherwise
    Add {
        title: String,

        /// Price per minute, e.g. 2.50
        #[arg(long)]
        rate: Option<String>,

        /// Cap for per-minute tariffs, the fee for flat ones
        #[arg(long = "max")]
        max_cost: String,
    },

    /// Edit a tariff
    Edit {
        id: u32,

        #[arg(long)]
        title: Option<String>,

        /// Switch to (or re-price) per-minute billing
        #[arg(long, conflicts_with = "flat")]
        rate: Option<String>,

        /// Switch to a flat fee
        #[arg(long)]
        flat: bool,

        #[arg(long = "max")]
        max_cost: Option<String>,
    },

    /// Delete a tariff nobody is using
    Rm { id: u32 },

    /// Offer the tariff to new visitors again
    Enable { id: u32 },

    /// Stop offering the tariff to new visitors
    Disable { id: u32 },

    /// Use the tariff for quick check-in
    Default { id: u32 },
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// First business date, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<String>,

    /// Last business date, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<String>,

    /// visitors, revenue, minutes or average_check
    #[arg(long, short = 'i')]
    pub indicator: Option<Indicator>,

    /// Forget the previous filter
    #[arg(long)]
    pub reset: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &[&str]) -> ShellCommand {
        ShellLine::try_parse_from(line).unwrap().command
    }

    #[test]
    fn test_add_joins_name_words() {
        match parse(&["add", "Франц", "2", "--tariff", "4"]) {
            ShellCommand::Add(args) => {
                assert_eq!(args.name.join(" "), "Франц 2");
                assert_eq!(args.tariff, Some(4));
                assert_eq!(args.discount, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_kebab_case_and_aliases() {
        assert!(matches!(parse(&["close-day"]), ShellCommand::CloseDay));
        assert!(matches!(parse(&["resume", "3"]), ShellCommand::Pause { id: 3 }));
        assert!(matches!(parse(&["exit"]), ShellCommand::Quit));
    }

    #[test]
    fn test_pay_all_conflicts_with_ids() {
        assert!(ShellLine::try_parse_from(["pay", "1", "--all"]).is_err());
        assert!(matches!(parse(&["pay", "--all"]), ShellCommand::Pay { all: true, .. }));
    }

    #[test]
    fn test_stats_indicator() {
        match parse(&["stats", "-i", "average_check"]) {
            ShellCommand::Stats(args) => assert_eq!(args.indicator, Some(Indicator::AverageCheck)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rm_requires_ids() {
        assert!(ShellLine::try_parse_from(["rm"]).is_err());
    }
}

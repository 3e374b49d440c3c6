//! # Operator Shell
//!
//! A line-oriented prompt. Every line is split into words (quotes keep
//! spaces), parsed with clap, dispatched to one command function, and
//! rendered as a table or JSON.
//!
//! ```text
//! lounge> add Franz
//! lounge> add "Франц 2" --tariff 4 --discount 10
//! lounge> pause 1
//! lounge> pay 1 2
//! lounge> confirm
//! lounge> close-day
//! ```
//!
//! Errors never end the session; they are printed and the prompt returns.

use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use clap::error::ErrorKind;
use clap::Parser;
use lounge_core::{Receipt, Settlement};
use tracing::debug;

use crate::cli::{OutputFormat, ShellCommand, ShellLine, TariffCommand};
use crate::commands::{config, day, statistics, tariff, visitor};
use crate::error::ApiError;
use crate::output::{render_error, render_list, render_single, render_table};
use crate::state::{ConfigState, StatisticsState, TariffsState, VisitorsState};

/// What the loop should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print this (possibly empty) text and read the next line.
    Continue(String),
    Quit,
}

/// The console session: all state plus the output format.
#[derive(Debug)]
pub struct Shell {
    tariffs: TariffsState,
    visitors: VisitorsState,
    statistics: StatisticsState,
    config: ConfigState,
    format: OutputFormat,
}

impl Shell {
    /// Builds the session from configuration.
    pub fn new(config: ConfigState) -> Result<Self, ApiError> {
        let tariffs = TariffsState::new(config.tariff_book()?);
        Ok(Shell {
            tariffs,
            visitors: VisitorsState::new(),
            statistics: StatisticsState::new(),
            format: config.output,
            config,
        })
    }

    pub fn config(&self) -> &ConfigState {
        &self.config
    }

    /// Runs one line at time `now`.
    pub fn execute(&self, line: &str, now: DateTime<Utc>) -> Outcome {
        let line = line.trim();
        if line.is_empty() {
            return Outcome::Continue(String::new());
        }

        let words = match split_words(line) {
            Ok(words) => words,
            Err(err) => return Outcome::Continue(render_error(self.format, &err)),
        };

        let parsed = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(err) => {
                let text = err.to_string().trim_end().to_string();
                return match err.kind() {
                    ErrorKind::DisplayHelp
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                        Outcome::Continue(text)
                    }
                    _ => {
                        debug!(line, "Unparsed shell line");
                        match self.format {
                            OutputFormat::Table => Outcome::Continue(text),
                            OutputFormat::Json => {
                                let err = ApiError::validation(text);
                                Outcome::Continue(render_error(self.format, &err))
                            }
                        }
                    }
                };
            }
        };

        match self.dispatch(parsed.command, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(code = ?err.code, "{}", err.message);
                Outcome::Continue(render_error(self.format, &err))
            }
        }
    }

    /// Reads lines until EOF or `quit`.
    ///
    /// With `interactive`, a banner and a prompt are printed.
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
        interactive: bool,
    ) -> Result<(), ApiError> {
        if interactive {
            writeln!(output, "{} desk. Type `help` for commands.", self.config.venue_name)?;
        }

        let mut line = String::new();
        loop {
            if interactive {
                write!(output, "lounge> ")?;
                output.flush()?;
            }

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            match self.execute(&line, Utc::now()) {
                Outcome::Continue(text) if text.is_empty() => {}
                Outcome::Continue(text) => writeln!(output, "{text}")?,
                Outcome::Quit => break,
            }
        }
        Ok(())
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn dispatch(&self, command: ShellCommand, now: DateTime<Utc>) -> Result<Outcome, ApiError> {
        let (format, cfg) = (self.format, &self.config);

        let text = match command {
            ShellCommand::Add(args) => {
                let request = visitor::AddVisitorRequest {
                    name: args.name.join(" "),
                    tariff_id: args.tariff,
                    discount: args.discount,
                };
                let dto = visitor::add_visitor(&self.tariffs, &self.visitors, request, now)?;
                render_single(format, &dto, |d| {
                    let at = cfg.format_time(d.checked_in_at);
                    format!("Checked in #{} {} on {} at {}", d.id, d.name, d.tariff, at)
                })?
            }

            ShellCommand::Edit(args) => {
                let request = visitor::EditVisitorRequest {
                    name: args.name,
                    tariff_id: args.tariff,
                    discount: args.discount,
                };
                let dto =
                    visitor::edit_visitor(&self.tariffs, &self.visitors, args.id, request, now)?;
                render_single(format, &dto, |d| {
                    let off = d.discount_percent;
                    format!("Updated #{} {}: {}, {}% off", d.id, d.name, d.tariff, off)
                })?
            }

            ShellCommand::Rm { ids } => {
                let names = visitor::delete_visitors(&self.visitors, &ids)?;
                render_single(format, &names, |n| format!("Removed: {}", n.join(", ")))?
            }

            ShellCommand::Pause { id } => {
                let dto = visitor::toggle_pause(&self.tariffs, &self.visitors, id, now)?;
                render_single(format, &dto, |d| format!("#{} {} is {}", d.id, d.name, d.status))?
            }

            ShellCommand::Ls => {
                let rows = visitor::list_visitors(&self.tariffs, &self.visitors, now)?;
                match format {
                    OutputFormat::Table if rows.is_empty() => "No visitors.".to_string(),
                    OutputFormat::Table => {
                        let mut text =
                            render_list(format, &rows, |d| visitor::VisitorRow::new(d, cfg))?;
                        if let Some(pending) = day::pending_payment(&self.visitors) {
                            text.push_str(&format!(
                                "\nPayment pending: {} (confirm / cancel)",
                                cfg.format_currency(pending.total)
                            ));
                        }
                        text
                    }
                    OutputFormat::Json => {
                        render_list(format, &rows, |d| visitor::VisitorRow::new(d, cfg))?
                    }
                }
            }

            ShellCommand::Pay { ids, all } => {
                let settlement = day::quote_payment(&self.tariffs, &self.visitors, &ids, all, now)?;
                render_single(format, &settlement, |s| describe_settlement(s, cfg))?
            }

            ShellCommand::Confirm => {
                let receipt = day::confirm_payment(&self.tariffs, &self.visitors, now)?;
                render_single(format, &receipt, |r| describe_receipt(r, cfg))?
            }

            ShellCommand::Cancel => {
                let dropped = day::cancel_payment(&self.visitors)?;
                render_single(format, &dropped, |_| "Payment cancelled.".to_string())?
            }

            ShellCommand::CloseDay => {
                let report = day::close_day(&self.tariffs, &self.visitors, now)?;
                render_single(format, &report, |r| {
                    format!(
                        "Day closed: {} visitor(s), {} min, revenue {}",
                        r.visitors,
                        r.minutes,
                        cfg.format_currency(r.revenue)
                    )
                })?
            }

            ShellCommand::Day => {
                let status = day::day_status(&self.visitors);
                render_single(format, &status, |s| {
                    if s.can_close {
                        format!("{} visitor(s) in the room, the day can be closed.", s.live)
                    } else {
                        format!("Still to pay: {}", s.unsettled.join(", "))
                    }
                })?
            }

            ShellCommand::History => {
                let history = day::get_history(&self.visitors);
                match format {
                    OutputFormat::Table if history.is_empty() => "History is empty.".to_string(),
                    _ => render_list(format, &history, |h| day::HistoryRow::new(h, cfg))?,
                }
            }

            ShellCommand::Tariffs => {
                let list = tariff::list_tariffs(&self.tariffs, &self.visitors);
                render_list(format, &list, |t| tariff::TariffRow::new(t, cfg))?
            }

            ShellCommand::Tariff { command } => self.dispatch_tariff(command)?,

            ShellCommand::Stats(args) => {
                let request = statistics::StatisticsRequest {
                    from: args.from,
                    to: args.to,
                    indicator: args.indicator,
                    reset: args.reset,
                };
                let dto =
                    statistics::get_statistics(&self.statistics, &self.visitors, cfg, request)?;
                render_single(format, &dto, |d| describe_statistics(d, cfg))?
            }

            ShellCommand::Config => {
                let current = config::get_config(cfg);
                render_single(format, &current, config::describe_config)?
            }

            ShellCommand::Quit => return Ok(Outcome::Quit),
        };

        Ok(Outcome::Continue(text))
    }

    fn dispatch_tariff(&self, command: TariffCommand) -> Result<String, ApiError> {
        let (tariffs, visitors) = (&self.tariffs, &self.visitors);

        let (dto, verb) = match command {
            TariffCommand::Add { title, rate, max_cost } => {
                let request = tariff::CreateTariffRequest { title, rate, max_cost };
                (tariff::create_tariff(tariffs, visitors, request)?, "Created")
            }
            TariffCommand::Edit {
                id,
                title,
                rate,
                flat,
                max_cost,
            } => {
                let request = tariff::UpdateTariffRequest {
                    title,
                    rate,
                    flat,
                    max_cost,
                };
                (tariff::update_tariff(tariffs, visitors, id, request)?, "Updated")
            }
            TariffCommand::Rm { id } => (tariff::delete_tariff(tariffs, visitors, id)?, "Deleted"),
            TariffCommand::Enable { id } => {
                (tariff::set_tariff_active(tariffs, visitors, id, true)?, "Enabled")
            }
            TariffCommand::Disable { id } => {
                (tariff::set_tariff_active(tariffs, visitors, id, false)?, "Disabled")
            }
            TariffCommand::Default { id } => {
                (tariff::set_default_tariff(tariffs, visitors, id)?, "Default is now")
            }
        };

        render_single(self.format, &dto, |t| format!("{} tariff #{} {}", verb, t.id, t.title))
    }
}

// =============================================================================
// Detail Views
// =============================================================================

fn describe_settlement(settlement: &Settlement, config: &ConfigState) -> String {
    let rows: Vec<day::ReceiptLineRow> = settlement
        .lines
        .iter()
        .map(|line| day::ReceiptLineRow::new(line, config))
        .collect();
    format!(
        "{}\nTotal: {}\nType `confirm` to mark as paid or `cancel`.",
        render_table(&rows),
        config.format_currency(settlement.total)
    )
}

fn describe_receipt(receipt: &Receipt, config: &ConfigState) -> String {
    let rows: Vec<day::ReceiptLineRow> = receipt
        .lines
        .iter()
        .map(|line| day::ReceiptLineRow::new(line, config))
        .collect();
    format!(
        "{}\nPaid {} at {}",
        render_table(&rows),
        config.format_currency(receipt.total),
        config.format_time(receipt.paid_at)
    )
}

fn describe_statistics(dto: &statistics::StatisticsDto, config: &ConfigState) -> String {
    let period = match (dto.start, dto.end) {
        (None, None) => "all time".to_string(),
        (start, end) => format!(
            "{} .. {}",
            start.map(|d| d.to_string()).unwrap_or_default(),
            end.map(|d| d.to_string()).unwrap_or_default()
        ),
    };
    if dto.points.is_empty() {
        return format!("{}, {}: no closed days.", dto.indicator, period);
    }
    let rows: Vec<statistics::BarRow> = dto
        .points
        .iter()
        .map(|p| statistics::BarRow::new(p, dto.indicator, config))
        .collect();
    format!("{}, {}\n{}", dto.indicator, period, render_table(&rows))
}

// =============================================================================
// Word Splitting
// =============================================================================

/// Splits a line on whitespace; single or double quotes keep spaces.
///
/// ```rust
/// use lounge_desk_lib::shell::split_words;
///
/// assert_eq!(split_words(r#"add "Франц 2" -d 10"#).unwrap(), ["add", "Франц 2", "-d", "10"]);
/// ```
pub fn split_words(line: &str) -> Result<Vec<String>, ApiError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ApiError::validation("Unterminated quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 8, 19, hour, min, 0).unwrap()
    }

    fn shell(format: OutputFormat) -> Shell {
        Shell::new(ConfigState {
            output: format,
            ..Default::default()
        })
        .unwrap()
    }

    fn text(outcome: Outcome) -> String {
        match outcome {
            Outcome::Continue(text) => text,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("  ls  ").unwrap(), ["ls"]);
        assert_eq!(split_words("add 'Hans Peter'").unwrap(), ["add", "Hans Peter"]);
        assert_eq!(split_words(r#"tariff add """#).unwrap(), ["tariff", "add", ""]);
        assert!(split_words("add \"Franz").is_err());
    }

    #[test]
    fn test_evening_session() {
        let shell = shell(OutputFormat::Table);

        assert!(text(shell.execute("add Franz", at(12, 0))).starts_with("Checked in #1 Franz"));
        text(shell.execute("add Hans --tariff 4", at(12, 0)));

        let listing = text(shell.execute("ls", at(12, 30)));
        assert!(listing.contains("75.00 ₽"));

        let quote = text(shell.execute("pay --all", at(12, 30)));
        assert!(quote.contains("Total: 175.00 ₽"));

        let receipt = text(shell.execute("confirm", at(12, 30)));
        assert!(receipt.contains("Paid 175.00 ₽ at 12:30"));

        let closed = text(shell.execute("close-day", at(23, 0)));
        assert_eq!(closed, "Day closed: 2 visitor(s), 60 min, revenue 175.00 ₽");

        assert!(text(shell.execute("history", at(23, 0))).contains("OneGame"));
        assert_eq!(text(shell.execute("ls", at(23, 0))), "No visitors.");
    }

    #[test]
    fn test_close_day_refusal_names_visitors() {
        let shell = shell(OutputFormat::Table);
        text(shell.execute("add Franz", at(12, 0)));
        assert_eq!(text(shell.execute("day", at(22, 59))), "Still to pay: Franz");

        let out = text(shell.execute("close-day", at(23, 0)));
        assert_eq!(out, "error: Settle all visitors before closing the day: Franz");

        text(shell.execute("pay 1", at(23, 1)));
        text(shell.execute("confirm", at(23, 1)));
        assert_eq!(
            text(shell.execute("status", at(23, 2))),
            "1 visitor(s) in the room, the day can be closed."
        );
    }

    #[test]
    fn test_json_output() {
        let shell = shell(OutputFormat::Json);
        let out = text(shell.execute("add Franz -d 10", at(12, 0)));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "Franz");
        assert_eq!(value["discount_percent"], 10);

        let err = text(shell.execute("pause 42", at(12, 5)));
        let value: serde_json::Value = serde_json::from_str(&err).unwrap();
        assert_eq!(value["code"], "NOT_FOUND");
    }

    #[test]
    fn test_parse_errors_do_not_quit() {
        let shell = shell(OutputFormat::Table);
        assert!(text(shell.execute("frobnicate", at(12, 0))).contains("error"));
        assert!(text(shell.execute("help", at(12, 0))).contains("close-day"));
        assert_eq!(shell.execute("", at(12, 0)), Outcome::Continue(String::new()));
        assert_eq!(shell.execute("quit", at(12, 0)), Outcome::Quit);
    }

    #[test]
    fn test_tariff_commands() {
        let shell = shell(OutputFormat::Table);
        assert_eq!(
            text(shell.execute("tariff add Day --rate 3 --max 500", at(12, 0))),
            "Created tariff #5 Day"
        );
        assert_eq!(
            text(shell.execute("tariff default 5", at(12, 0))),
            "Default is now tariff #5 Day"
        );
        assert!(text(shell.execute("add Franz", at(12, 0))).contains("on Day"));
        assert!(text(shell.execute("tariff rm 5", at(12, 0))).starts_with("error:"));
    }

    #[test]
    fn test_stats() {
        let shell = shell(OutputFormat::Table);
        assert_eq!(
            text(shell.execute("stats -i revenue", at(12, 0))),
            "revenue, all time: no closed days."
        );
        text(shell.execute("add Franz", at(12, 0)));
        text(shell.execute("pay 1", at(12, 30)));
        text(shell.execute("confirm", at(12, 30)));
        text(shell.execute("close-day", at(23, 0)));

        let chart = text(shell.execute("stats", at(23, 1)));
        assert!(chart.starts_with("revenue, all time"));
        assert!(chart.contains("19.08.2020"));
        assert!(chart.contains("75.00 ₽"));
    }

    #[test]
    fn test_run_reads_until_quit() {
        let shell = shell(OutputFormat::Table);
        let input = b"add Franz\n\nquit\nadd Hans\n";
        let mut out = Vec::new();
        shell.run(&input[..], &mut out, false).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Franz"));
        assert!(!out.contains("Hans"));
    }
}

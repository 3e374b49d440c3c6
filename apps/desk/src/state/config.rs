//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`LOUNGE_*`)
//! 2. Config file (`--config`, `LOUNGE_CONFIG`, or the platform config dir)
//! 3. Defaults (this file)
//!
//! ```toml
//! venue_name = "Lounge"
//! currency_symbol = "₽"
//! utc_offset_minutes = 180
//!
//! [[tariffs]]
//! title = "2,5р/мин"
//! rate = "2.50"
//! max_cost = "600"
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use directories::ProjectDirs;
use lounge_core::validation::parse_amount;
use lounge_core::{CoreError, Money, NewTariff, TariffBook, TariffStatus, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cli::OutputFormat;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "LOUNGE_CONFIG";

/// Largest UTC offset a venue can be in, in minutes.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Decimal places every amount is stored with.
const MONEY_DECIMALS: u8 = 2;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("UTC offset must be within ±840 minutes, got {0}")]
    InvalidOffset(i32),

    #[error("Amounts are kept in hundredths; currency_decimals must be 2, got {0}")]
    InvalidDecimals(u8),

    #[error("Invalid tariff in config: {0}")]
    Tariff(#[from] CoreError),
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::Tariff(CoreError::Validation(err))
    }
}

/// Where the currency symbol goes relative to the amount.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    /// `600.00 ₽`
    #[default]
    After,
}

/// A tariff from the config file. Amounts are written the way the operator
/// types them (`"2.50"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TariffSeed {
    pub title: String,
    /// Per-minute rate; omitted for flat tariffs.
    #[serde(default)]
    pub rate: Option<String>,
    pub max_cost: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    /// Venue name (shown in the prompt banner)
    pub venue_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Where the symbol goes
    pub currency_symbol_position: SymbolPosition,

    /// Number of decimal places for currency; amounts are kept in
    /// hundredths, so only 2 is accepted
    pub currency_decimals: u8,

    /// Venue offset from UTC; business dates and clock times use it
    pub utc_offset_minutes: i32,

    /// Output format when `--output` is not given
    pub output: OutputFormat,

    /// Tariff catalogue at startup; empty means the standard four
    pub tariffs: Vec<TariffSeed>,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Venue: "Lounge"
    /// - Currency: RUB (₽ after the amount)
    /// - Offset: UTC
    /// - Tariffs: the standard catalogue
    fn default() -> Self {
        ConfigState {
            venue_name: "Lounge".to_string(),
            currency_code: "RUB".to_string(),
            currency_symbol: "₽".to_string(),
            currency_symbol_position: SymbolPosition::After,
            currency_decimals: MONEY_DECIMALS,
            utc_offset_minutes: 0,
            output: OutputFormat::Table,
            tariffs: Vec::new(),
        }
    }
}

impl ConfigState {
    /// Loads file then environment over the defaults.
    ///
    /// An explicit path (flag or `LOUNGE_CONFIG`) must exist; the platform
    /// default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    ConfigState::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies `LOUNGE_*` overrides.
    ///
    /// ## Environment Variables
    /// - `LOUNGE_VENUE_NAME`
    /// - `LOUNGE_CURRENCY_CODE`, `LOUNGE_CURRENCY_SYMBOL`
    /// - `LOUNGE_UTC_OFFSET_MINUTES` (e.g. `180` for Moscow)
    /// - `LOUNGE_OUTPUT` (`table` or `json`)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("LOUNGE_VENUE_NAME") {
            self.venue_name = name;
        }
        if let Some(code) = lookup("LOUNGE_CURRENCY_CODE") {
            self.currency_code = code;
        }
        if let Some(symbol) = lookup("LOUNGE_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }
        if let Some(value) = lookup("LOUNGE_UTC_OFFSET_MINUTES") {
            self.utc_offset_minutes = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "LOUNGE_UTC_OFFSET_MINUTES".to_string(),
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("LOUNGE_OUTPUT") {
            self.output = match value.trim().to_lowercase().as_str() {
                "table" => OutputFormat::Table,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: "LOUNGE_OUTPUT".to_string(),
                        value,
                    })
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::InvalidOffset(self.utc_offset_minutes));
        }
        if self.currency_decimals != MONEY_DECIMALS {
            return Err(ConfigError::InvalidDecimals(self.currency_decimals));
        }
        Ok(())
    }

    /// The starting tariff catalogue.
    pub fn tariff_book(&self) -> Result<TariffBook, ConfigError> {
        if self.tariffs.is_empty() {
            return Ok(TariffBook::with_defaults());
        }

        let mut seeds = Vec::with_capacity(self.tariffs.len());
        for seed in &self.tariffs {
            let max_cost = parse_amount("max cost", &seed.max_cost)?;
            let tariff = match &seed.rate {
                Some(rate) => {
                    NewTariff::per_minute(&seed.title, parse_amount("rate", rate)?, max_cost)
                }
                None => NewTariff::flat(&seed.title, max_cost),
            };
            let status = if seed.active {
                TariffStatus::Active
            } else {
                TariffStatus::Inactive
            };
            seeds.push((tariff, status));
        }
        Ok(TariffBook::from_seed(seeds)?)
    }

    /// The venue's offset. Falls back to UTC if the configured value is out
    /// of range.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(60_000)), "600.00 ₽");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let number = Money::from_cents(amount.cents().saturating_abs());

        match self.currency_symbol_position {
            SymbolPosition::Before => format!("{}{}{}", sign, self.currency_symbol, number),
            SymbolPosition::After => format!("{}{} {}", sign, number, self.currency_symbol),
        }
    }

    /// Venue-local clock time, `HH:MM`.
    pub fn format_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.utc_offset()).format("%H:%M").to_string()
    }

    /// Venue-local date and time, `YYYY-MM-DD HH:MM`.
    pub fn format_datetime(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.utc_offset())
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

/// Platform config file location.
///
/// - **Linux**: `~/.config/lounge/config.toml`
/// - **macOS**: `~/Library/Application Support/com.lounge.lounge/config.toml`
/// - **Windows**: `%APPDATA%\lounge\lounge\config\config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "lounge", "lounge").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lounge_core::{BillingMode, TariffId};

    #[test]
    fn test_format_currency_default() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_cents(60_000)), "600.00 ₽");
        assert_eq!(config.format_currency(Money::from_cents(1)), "0.01 ₽");
        assert_eq!(config.format_currency(Money::from_cents(-250)), "-2.50 ₽");
    }

    #[test]
    fn test_format_currency_symbol_before() {
        let config = ConfigState {
            currency_symbol: "$".to_string(),
            currency_symbol_position: SymbolPosition::Before,
            ..Default::default()
        };
        assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
        assert_eq!(config.format_currency(Money::from_cents(-1234)), "-$12.34");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = "venue_name = \"Franz Lounge\"\nutc_offset_minutes = 180\n";
        let config = ConfigState::from_toml(text).unwrap();
        assert_eq!(config.venue_name, "Franz Lounge");
        assert_eq!(config.currency_code, "RUB");
        assert_eq!(config.utc_offset(), FixedOffset::east_opt(3 * 3600).unwrap());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = ConfigState::from_toml("venue_name = \"File\"").unwrap();
        config
            .apply_env(|key| match key {
                "LOUNGE_VENUE_NAME" => Some("Env".to_string()),
                "LOUNGE_OUTPUT" => Some("json".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.venue_name, "Env");
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = ConfigState::default();
        let err = config
            .apply_env(|key| (key == "LOUNGE_UTC_OFFSET_MINUTES").then(|| "three".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_offset_out_of_range() {
        let config = ConfigState {
            utc_offset_minutes: 15 * 60,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidOffset(900))));
    }

    #[test]
    fn test_currency_decimals_must_match_money() {
        let config = ConfigState::from_toml("currency_decimals = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDecimals(0))));

        let config = ConfigState::from_toml("currency_decimals = 19").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDecimals(19))));
        assert_eq!(config.format_currency(Money::from_cents(60_000)), "600.00 ₽");

        assert!(ConfigState::from_toml("currency_decimals = 2").unwrap().validate().is_ok());
    }

    #[test]
    fn test_tariff_seeds() {
        let config = ConfigState::from_toml(
            r#"
            [[tariffs]]
            title = "Day"
            rate = "3,00"
            max_cost = "500"

            [[tariffs]]
            title = "Night"
            max_cost = "400"
            active = false
            "#,
        )
        .unwrap();

        let book = config.tariff_book().unwrap();
        assert_eq!(book.len(), 2);
        let day = book.get(TariffId::new(1)).unwrap();
        assert_eq!(day.billing, BillingMode::PerMinute { rate: Money::from_cents(300) });
        assert!(!book.get(TariffId::new(2)).unwrap().is_active());
    }

    #[test]
    fn test_empty_seeds_use_standard_catalogue() {
        assert_eq!(ConfigState::default().tariff_book().unwrap().len(), 4);
    }

    #[test]
    fn test_format_time_uses_offset() {
        let config = ConfigState {
            utc_offset_minutes: 180,
            ..Default::default()
        };
        let at = Utc.with_ymd_and_hms(2020, 8, 19, 21, 30, 0).unwrap();
        assert_eq!(config.format_time(at), "00:30");
        assert_eq!(config.format_datetime(at), "2020-08-20 00:30");
    }
}

//! # Config Commands

use tracing::debug;

use crate::state::ConfigState;

/// Returns the active configuration.
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}

/// A human-readable summary for the table view.
pub fn describe_config(config: &ConfigState) -> String {
    let sign = if config.utc_offset_minutes < 0 { '-' } else { '+' };
    let offset = config.utc_offset_minutes.abs();
    format!(
        concat!(
            "Venue:     {}\n",
            "Currency:  {} ({})\n",
            "UTC:       {}{:02}:{:02}\n",
            "Output:    {:?}\n",
            "Tariffs:   {}",
        ),
        config.venue_name,
        config.currency_code,
        config.currency_symbol,
        sign,
        offset / 60,
        offset % 60,
        config.output,
        if config.tariffs.is_empty() {
            "standard catalogue".to_string()
        } else {
            format!("{} from config", config.tariffs.len())
        },
    )
}

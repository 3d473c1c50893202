//! # Config Commands

use tracing::debug;

use crate::state::ConfigState;

/// Returns the running configuration.
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}

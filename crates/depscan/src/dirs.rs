//! Platform-specific configuration directories

use std::path::PathBuf;

use etcetera::BaseStrategy;
use log::debug;

use crate::config::CONFIG_FILE_NAME;

/// `$XDG_CONFIG_HOME/depscan` on Unix, `%APPDATA%\depscan` on Windows
pub fn user_config_dir() -> Option<PathBuf> {
    match etcetera::choose_base_strategy() {
        Ok(strategy) => Some(strategy.config_dir().join("depscan")),
        Err(e) => {
            debug!("Could not determine the user configuration directory: {e}");
            None
        }
    }
}

pub fn user_config_file() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

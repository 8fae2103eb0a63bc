//! Config discovery for tailf.
//!
//! An explicit `--config` path always wins; otherwise the global config at
//! `~/.config/tailf/config.yaml` is used when it exists.

use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "tailf";

/// Global config filename within the tailf config directory.
pub const GLOBAL_CONFIG_NAME: &str = "config.yaml";

/// Path of the global config file, whether or not it exists.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(GLOBAL_CONFIG_NAME))
}

/// Pick the config file to load, if any.
///
/// An explicit path is returned as-is so that a missing file surfaces as a
/// read error instead of silently falling back to defaults.
pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    global_config_path().filter(|path| path.try_exists().unwrap_or(false) && path.is_file())
}

//! Utility functions shared across the crate.

use std::path::PathBuf;

use chrono::Local;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Build a timestamped output file name, e.g. `MERGE27052024143055.pdf`.
///
/// The timestamp is local time formatted day(2)month(2)year(4)hour(2)
/// minute(2)second(2). Two merges started within the same second collide.
pub fn merge_file_name(prefix: &str) -> String {
    format!("{}{}.pdf", prefix, Local::now().format("%d%m%Y%H%M%S"))
}

//! Platform-specific default locations.
//!
//! Lookups take an environment accessor so they can be tested without touching
//! the process environment; the plain variants read `std::env`.

use std::path::PathBuf;
use tracing::{debug, error};

/// Directory name used under the platform configuration root.
pub const CONFIG_DIRECTORY_NAME: &str = "gameconf";

/// File name of the configuration document inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default game data directory for this platform.
pub fn default_game_path() -> PathBuf {
    default_game_path_impl()
}

#[cfg(windows)]
fn default_game_path_impl() -> PathBuf {
    PathBuf::from(r"C:\Program Files\Rockstar Games\GTAIII")
}

#[cfg(not(windows))]
fn default_game_path_impl() -> PathBuf {
    PathBuf::from("/opt/games/Grand Theft Auto 3")
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Default configuration directory, or `None` if the platform has none.
pub fn default_config_dir() -> Option<PathBuf> {
    default_config_dir_with(env_var)
}

/// Default configuration file (`<config dir>/config.ini`).
pub fn default_config_file() -> Option<PathBuf> {
    default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// [`default_config_dir`] with an injectable environment lookup.
pub fn default_config_dir_with<F>(env: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let dir = config_dir_impl(&env);
    match &dir {
        Some(dir) => debug!(target: "gameconf::paths", dir = %dir.display(), "Default config directory"),
        None => error!(target: "gameconf::paths", "No default config path found"),
    }
    dir
}

#[cfg(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn config_dir_impl(env: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(config_home) = env("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(config_home).join(CONFIG_DIRECTORY_NAME));
    }
    env("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIRECTORY_NAME)
    })
}

#[cfg(target_os = "macos")]
fn config_dir_impl(env: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    env("HOME").map(|home| {
        PathBuf::from(home)
            .join("Library/Preferences")
            .join(CONFIG_DIRECTORY_NAME)
    })
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "macos"
)))]
fn config_dir_impl(_env: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    None
}

//! Settings file resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths →
//! system directory → builtin defaults.

use std::path::{Path, PathBuf};

/// Where a settings file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/pgm/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A resolved settings path (or none) and where it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "PGM_CONFIG";
pub const ENV_CONFIG_DIR: &str = "PGM_CONFIG_DIR";

/// Settings file names, in lookup order within a directory.
const SETTINGS_FILENAMES: [&str; 2] = ["pgm.toml", "pgm.json"];

/// Application name for XDG directories.
const APP_NAME: &str = "pgm";

/// Resolve the settings file path.
///
/// 1. Explicit CLI path (if it exists)
/// 2. `PGM_CONFIG` (direct path)
/// 3. `PGM_CONFIG_DIR` + `pgm.toml` / `pgm.json`
/// 4. XDG config directory (~/.config/pgm/)
/// 5. System config (/etc/pgm/)
/// 6. Built-in defaults (None)
pub fn resolve_settings_path(cli_path: Option<&Path>) -> ResolvedPath {
    if let Some(path) = cli_path {
        if path.exists() {
            return found(path.to_path_buf(), ConfigSource::CliArgument);
        }
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = find_in_dir(Path::new(&config_dir)) {
            return found(path, ConfigSource::Environment);
        }
    }

    if let Some(dir) = xdg_config_dir() {
        if let Some(path) = find_in_dir(&dir) {
            return found(path, ConfigSource::XdgConfig);
        }
    }

    if let Some(path) = find_in_dir(&system_config_dir()) {
        return found(path, ConfigSource::SystemConfig);
    }

    ResolvedPath::default()
}

fn found(path: PathBuf, source: ConfigSource) -> ResolvedPath {
    ResolvedPath {
        path: Some(path),
        source,
    }
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    SETTINGS_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Get the XDG config directory for pgm.
///
/// Honors `XDG_CONFIG_HOME` before falling back to the platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Some(PathBuf::from(xdg).join(APP_NAME));
        }
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(format!("{}", ConfigSource::SystemConfig), "system config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_missing_cli_path_is_skipped() {
        let resolved = resolve_settings_path(Some(Path::new("/nonexistent/pgm.toml")));
        assert_ne!(resolved.source, ConfigSource::CliArgument);
    }

    #[test]
    fn test_system_config_dir() {
        assert_eq!(system_config_dir(), PathBuf::from("/etc/pgm"));
    }
}

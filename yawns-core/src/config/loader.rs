//! Locating and reading the configuration file.

use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;
use tracing::{debug, info};

use super::types::{RawConfig, YawnsConfig};
use crate::error::{ConfigError, CoreError};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Loads the configuration from an explicit path.
///
/// Unlike [`load_config`], a missing file here is an error: the user asked
/// for this specific file.
pub fn load_config_from_path(path: &Path) -> Result<YawnsConfig, CoreError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = RawConfig::parse(&text)?.resolve()?;
    info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Loads the configuration from the XDG config directory
/// (`$XDG_CONFIG_HOME/yawns/config.toml`), falling back to built-in
/// defaults when no file exists.
pub fn load_config() -> Result<YawnsConfig, CoreError> {
    match default_config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        Some(path) => {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(YawnsConfig::default())
        }
        None => {
            debug!("could not determine config directory, using defaults");
            Ok(YawnsConfig::default())
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "yawns").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from_path(Path::new("/nonexistent/yawns.toml")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Config(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn explicit_path_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[corner]\ngap = 24").unwrap();
        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.corner.gap, 24);
    }

    #[test]
    fn invalid_toml_surfaces_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[corner").unwrap();
        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::Parse(_))));
    }
}

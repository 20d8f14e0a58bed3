// Configuration loader
// Loads settings from an explicit path, ./tutor.toml or ~/.tutor/config.toml,
// then applies environment overrides.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;

/// Load configuration.
///
/// `explicit` (the `--config` flag) must exist when given. Otherwise the
/// first of `./tutor.toml` and `~/.tutor/config.toml` that exists is used,
/// falling back to built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => read_config_file(path)?,
        None => match default_config_paths().into_iter().find(|p| p.exists()) {
            Some(path) => read_config_file(&path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config);

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("tutor.toml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".tutor").join("config.toml"));
    }
    paths
}

fn read_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    tracing::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Some(addr) = non_empty_env("TUTOR_BIND_ADDRESS") {
        config.server.bind_address = addr;
    }
    if let Some(path) = non_empty_env("TUTOR_CONTENT_PATH") {
        config.content.path = PathBuf::from(path);
    }
    if let Some(dir) = non_empty_env("TUTOR_LOG_DIR") {
        config.content.log_dir = PathBuf::from(dir);
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nbind_address = \"0.0.0.0:9001\"\n\n[content]\npath = \"/srv/contents.json\""
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:9001");
        assert_eq!(config.content.path, PathBuf::from("/srv/contents.json"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = load_config(Some(Path::new("/nonexistent/tutor.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbind_address = ").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }
}

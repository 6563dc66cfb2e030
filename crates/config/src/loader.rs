use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use {
    anyhow::Context,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::SwitchboardConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "switchboard.toml",
    "switchboard.yaml",
    "switchboard.yml",
    "switchboard.json",
];

/// Override for the config directory, set via `set_config_dir()`.
static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Restrict discovery to `path`. The working directory and the user-global
/// directory are no longer searched.
pub fn set_config_dir(path: PathBuf) {
    *CONFIG_DIR_OVERRIDE.lock().unwrap_or_else(|e| e.into_inner()) = Some(path);
}

/// Restore default discovery.
pub fn clear_config_dir() {
    *CONFIG_DIR_OVERRIDE.lock().unwrap_or_else(|e| e.into_inner()) = None;
}

fn config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Load config from `path`, picking the format from its extension.
pub fn load_config(path: &Path) -> anyhow::Result<SwitchboardConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path).with_context(|| format!("failed to parse {}", path.display()))
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./switchboard.{toml,yaml,yml,json}`
/// 2. `~/.config/switchboard/switchboard.{toml,yaml,yml,json}`
///
/// Falls back to `SwitchboardConfig::default()` when nothing is found or the
/// file cannot be parsed.
pub fn discover_and_load() -> SwitchboardConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return SwitchboardConfig::default();
    };

    debug!(path = %path.display(), "loading config");
    load_config(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
        SwitchboardConfig::default()
    })
}

/// First config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return find_config_in(&dir);
    }

    find_config_in(Path::new(".")).or_else(|| user_config_dir().and_then(|d| find_config_in(&d)))
}

fn find_config_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// The config directory: the override, or `~/.config/switchboard/`.
pub fn config_dir() -> Option<PathBuf> {
    config_dir_override().or_else(user_config_dir)
}

fn user_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().join(".config").join("switchboard"))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<SwitchboardConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_each_format() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("switchboard.toml");
        std::fs::write(&toml_path, "[gateway]\nbase_url = \"http://toml\"\n").unwrap();
        assert_eq!(load_config(&toml_path).unwrap().gateway.base_url, "http://toml");

        let yaml_path = dir.path().join("switchboard.yaml");
        std::fs::write(&yaml_path, "instances:\n  refresh_interval_secs: 30\n").unwrap();
        assert_eq!(
            load_config(&yaml_path).unwrap().instances.refresh_interval_secs,
            30
        );

        let json_path = dir.path().join("switchboard.json");
        std::fs::write(&json_path, r#"{"gateway":{"timeout_secs":5}}"#).unwrap();
        assert_eq!(load_config(&json_path).unwrap().gateway.timeout_secs, 5);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switchboard.ini");
        std::fs::write(&path, "x=1").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/switchboard.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/switchboard.toml"));
    }

    #[test]
    fn finds_toml_before_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("switchboard.yaml"), "{}").unwrap();
        std::fs::write(dir.path().join("switchboard.toml"), "").unwrap();
        assert_eq!(
            find_config_in(dir.path()),
            Some(dir.path().join("switchboard.toml"))
        );
        let empty = tempfile::tempdir().unwrap();
        assert!(find_config_in(empty.path()).is_none());
    }

    #[test]
    fn override_dir_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("switchboard.toml"),
            "[gateway]\nbase_url = \"http://override\"\n",
        )
        .unwrap();

        set_config_dir(dir.path().to_path_buf());
        let cfg = discover_and_load();
        assert_eq!(config_dir(), Some(dir.path().to_path_buf()));
        clear_config_dir();

        assert_eq!(cfg.gateway.base_url, "http://override");
    }
}

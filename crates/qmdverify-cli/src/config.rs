use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "http://localhost:8080";
pub const HOST_ENV: &str = "QMDVERIFY_HOST";
/// Overrides the config file location.
pub const CONFIG_ENV: &str = "QMDVERIFY_CONFIG";

/// Contents of `<config_dir>/qmdverify/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub host: Option<String>,
}

impl ConfigFile {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// `QMDVERIFY_CONFIG` when set, else `<config_dir>/qmdverify/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("qmdverify").join("config.toml"))
    }
}

/// Where the server address came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSource {
    Flag,
    Env,
    File(PathBuf),
    Default,
}

/// Resolved once at start-up and passed by reference to handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_host: String,
    pub source: HostSource,
}

impl Config {
    /// Resolve the server address based on priority:
    /// 1. `--host` flag
    /// 2. `QMDVERIFY_HOST` environment variable
    /// 3. `host` in the user config file
    /// 4. `http://localhost:8080`
    pub fn resolve(flag: Option<&str>) -> Result<Self> {
        Self::resolve_with(
            flag,
            |key| std::env::var(key).ok(),
            ConfigFile::default_path().as_deref(),
        )
    }

    pub fn resolve_with(
        flag: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
        config_path: Option<&Path>,
    ) -> Result<Self> {
        if let Some(host) = non_empty(flag.map(str::to_string)) {
            return Ok(Self::new(&host, HostSource::Flag));
        }

        if let Some(host) = non_empty(env(HOST_ENV)) {
            return Ok(Self::new(&host, HostSource::Env));
        }

        if let Some(path) = config_path
            && let Some(host) = non_empty(ConfigFile::load_from(path)?.host)
        {
            return Ok(Self::new(&host, HostSource::File(path.to_path_buf())));
        }

        Ok(Self::new(DEFAULT_HOST, HostSource::Default))
    }

    fn new(host: &str, source: HostSource) -> Self {
        Self {
            server_host: host.trim_end_matches('/').to_string(),
            source,
        }
    }

    pub fn api_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.server_host, path)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_host() {
        let config = Config::resolve_with(None, no_env, None).unwrap();
        assert_eq!(config.server_host, "http://localhost:8080");
        assert_eq!(config.source, HostSource::Default);
    }

    #[test]
    fn test_env_overrides_default_and_strips_slash() {
        let env = |key: &str| (key == HOST_ENV).then(|| "https://qmd.example.com/".to_string());
        let config = Config::resolve_with(None, env, None).unwrap();
        assert_eq!(config.server_host, "https://qmd.example.com");
        assert_eq!(config.source, HostSource::Env);
    }

    #[test]
    fn test_empty_env_falls_through() {
        let env = |_: &str| Some(String::new());
        let config = Config::resolve_with(None, env, None).unwrap();
        assert_eq!(config.source, HostSource::Default);
    }

    #[test]
    fn test_flag_wins() {
        let env = |_: &str| Some("http://env:1".to_string());
        let config = Config::resolve_with(Some("http://flag:2/"), env, None).unwrap();
        assert_eq!(config.server_host, "http://flag:2");
        assert_eq!(config.source, HostSource::Flag);
    }

    #[test]
    fn test_config_file_host() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = \"http://192.168.1.20:8080\"\n")?;

        let config = Config::resolve_with(None, no_env, Some(&path))?;
        assert_eq!(config.server_host, "http://192.168.1.20:8080");
        assert_eq!(config.source, HostSource::File(path));
        Ok(())
    }

    #[test]
    fn test_missing_config_file_is_default() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("absent.toml");
        let config = Config::resolve_with(None, no_env, Some(&path))?;
        assert_eq!(config.source, HostSource::Default);
        Ok(())
    }

    #[test]
    fn test_malformed_config_file_is_error() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = [")?;
        assert!(Config::resolve_with(None, no_env, Some(&path)).is_err());
        Ok(())
    }

    #[test]
    fn test_api_endpoint() {
        let config = Config::resolve_with(Some("http://localhost:8080"), no_env, None).unwrap();
        assert_eq!(
            config.api_endpoint("/api/hashtables"),
            "http://localhost:8080/api/hashtables"
        );
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::index::DEFAULT_MAX_MESSAGES_TO_INDEX;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Transcript root override. When unset, `~/.claude/projects` is used.
    pub root: Option<PathBuf>,
    pub max_messages_to_index: usize,
    pub debounce_ms: u64,
    pub git_timeout_secs: u64,
    /// Safety-net rescan interval while serving; the filesystem watcher can
    /// miss events on some platforms.
    pub periodic_refresh_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { port: 8373 }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            root: None,
            max_messages_to_index: DEFAULT_MAX_MESSAGES_TO_INDEX,
            debounce_ms: 500,
            git_timeout_secs: 3,
            periodic_refresh_secs: 300,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "traceboard", "traceboard")
        {
            let config_file = config_dir.config_dir().join("config.toml");
            if config_file.exists() {
                let content = std::fs::read_to_string(config_file)?;
                let config: Config = toml::from_str(&content)?;
                return Ok(config);
            }
        }
        Ok(Config::default())
    }

    /// Effective transcript root: the configured override, or the per-user
    /// default location.
    pub fn transcript_root(&self) -> PathBuf {
        if let Some(root) = &self.scan.root {
            return root.clone();
        }
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".claude").join("projects"))
            .unwrap_or_else(|| PathBuf::from(".claude/projects"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.server.port, 8373);
        assert_eq!(config.scan.max_messages_to_index, 15);
        assert_eq!(config.scan.debounce_ms, 500);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.scan.debounce_ms, 500);
        assert_eq!(config.scan.periodic_refresh_secs, 300);
    }

    #[test]
    fn root_override_wins() {
        let mut config = Config::default();
        config.scan.root = Some(PathBuf::from("/custom/root"));
        assert_eq!(config.transcript_root(), PathBuf::from("/custom/root"));
    }
}

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "muster.toml";
pub const ENV_PREFIX: &str = "MUSTER_";
pub const DEFAULT_PORT: u16 = 5275;
pub const DEFAULT_HUB_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    pub bind: SocketAddr,
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr only when unset.
    pub log_dir: Option<PathBuf>,
    /// Directory receiving `event_{id}_summary.json` after each check-in.
    pub snapshot_dir: Option<PathBuf>,
    /// Roster CSV imported into a fresh event at startup.
    pub bootstrap_roster: Option<PathBuf>,
    /// Summaries buffered per push subscriber before it starts lagging.
    pub hub_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            log_level: muster_core::default_log_level().to_string(),
            log_dir: None,
            snapshot_dir: None,
            bootstrap_roster: None,
            hub_capacity: DEFAULT_HUB_CAPACITY,
        }
    }
}

impl Config {
    /// `log_dir` as the UTF-8 string the logger expects.
    pub fn log_dir_str(&self) -> Result<Option<&str>, ConfigError> {
        self.log_dir
            .as_deref()
            .map(|dir| {
                dir.to_str()
                    .ok_or_else(|| ConfigError::NonUtf8Path("log_dir", dir.to_path_buf()))
            })
            .transpose()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    Figment(#[from] figment::Error),
    #[error("`{0}` must be valid UTF-8: {}", .1.display())]
    NonUtf8Path(&'static str, PathBuf),
}

/// Merges defaults, the TOML file at `path` (if present) and `MUSTER_*`
/// environment variables, in that order.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    Ok(Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?)
}

#[cfg(test)]
mod tests {
    use super::{load_config, Config, DEFAULT_HUB_CAPACITY, DEFAULT_PORT};
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.bind.port(), DEFAULT_PORT);
        assert_eq!(config.hub_capacity, DEFAULT_HUB_CAPACITY);
        assert_eq!(config.snapshot_dir, None);
        assert_eq!(config.log_dir_str().unwrap(), None);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("muster.toml");
        std::fs::write(
            &path,
            "bind = \"127.0.0.1:8088\"\nlog_dir = \"/var/log/muster\"\nsnapshot_dir = \"data\"\nhub_capacity = 8\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.bind, "127.0.0.1:8088".parse().unwrap());
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/muster")));
        assert_eq!(config.log_dir_str().unwrap(), Some("/var/log/muster"));
        assert_eq!(config.snapshot_dir, Some(PathBuf::from("data")));
        assert_eq!(config.hub_capacity, 8);
        assert_eq!(config.log_level, Config::default().log_level);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("muster.toml");
        std::fs::write(&path, "hub_capacity = \"many\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}

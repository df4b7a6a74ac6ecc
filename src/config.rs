use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::clock::VirtualClock;
use crate::error::Result;
use crate::warnings::Warning;

/// Config file used when neither `--config` nor `RESTORAN_CONFIG` is given.
pub const DEFAULT_CONFIG_FILE: &str = "restoran.json";

/// Data directory used when the config does not name one.
pub const DEFAULT_DATA_DIR: &str = "restoran-data";

/// Persistent operator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the data files.
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    /// Simulated current time. `None` means the real local time.
    #[serde(default)]
    pub virtual_now: Option<NaiveDateTime>,
}

impl Config {
    /// Read the config at `path`. A missing file yields the defaults; an
    /// unreadable or malformed one yields the defaults plus a warning.
    pub fn load(path: &Path) -> (Self, Option<Warning>) {
        if !path.exists() {
            return (Self::default(), None);
        }

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| serde_json::from_str::<Config>(&json).map_err(|e| e.to_string()));

        match parsed {
            Ok(config) => (config, None),
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "ignoring unreadable config");
                (
                    Self::default(),
                    Some(Warning::UnreadableConfig {
                        path: path.to_path_buf(),
                        reason,
                    }),
                )
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// The configured data directory, or the fallback when unset or blank.
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_path {
            Some(p) if !p.as_os_str().is_empty() => p.clone(),
            _ => PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    /// Build the clock the business rules should see. `override_now` (from
    /// the command line) wins over the stored virtual time.
    pub fn clock(&self, override_now: Option<NaiveDateTime>) -> VirtualClock {
        match override_now.or(self.virtual_now) {
            Some(now) => VirtualClock::new(now),
            None => VirtualClock::from_system(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{parse_time, Clock, SystemClock};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert!(config.virtual_now.is_none());
    }

    #[test]
    fn test_blank_data_path_falls_back() {
        let config = Config {
            data_path: Some(PathBuf::new()),
            virtual_now: None,
        };
        assert_eq!(config.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn test_missing_file_is_default_without_warning() {
        let tmp = TempDir::new().unwrap();
        let (config, warning) = Config::load(&tmp.path().join("absent.json"));
        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }

    #[test]
    fn test_malformed_file_is_default_with_warning() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("restoran.json");
        fs::write(&path, "data_path = nope").unwrap();

        let (config, warning) = Config::load(&path);
        assert_eq!(config, Config::default());
        assert!(matches!(warning, Some(Warning::UnreadableConfig { .. })));
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("restoran.json");
        let config = Config {
            data_path: Some(tmp.path().join("data")),
            virtual_now: parse_time("2024-05-01 12:00"),
        };

        config.save(&path).unwrap();
        let (loaded, warning) = Config::load(&path);

        assert!(warning.is_none());
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_clock_prefers_override() {
        let config = Config {
            data_path: None,
            virtual_now: parse_time("2024-05-01 12:00"),
        };
        assert_eq!(config.clock(None).now(), parse_time("2024-05-01 12:00").unwrap());

        let over = parse_time("2024-07-01 08:30");
        assert_eq!(config.clock(over).now(), over.unwrap());
    }

    #[test]
    fn test_clock_without_virtual_time_follows_system() {
        let before = SystemClock.now();
        let now = Config::default().clock(None).now();
        let after = SystemClock.now();
        assert!(before <= now && now <= after);
    }
}

use crate::cache::DEFAULT_UPCOMING_DAYS;
use crate::error::{EventKeepError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_GROUP_ID: &str = "group.eventkeep.shared";

/// Configuration for eventkeep, stored in `<root>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventKeepConfig {
    /// Shared namespace the app and widget both read (a directory under the root)
    #[serde(default = "default_group_id")]
    pub group_id: String,

    /// Window for the `upcoming` query, in days
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: i64,

    /// Command run after each save to refresh widgets (e.g. `["widgetctl", "reload"]`)
    #[serde(default)]
    pub refresh_command: Vec<String>,
}

fn default_group_id() -> String {
    DEFAULT_GROUP_ID.to_string()
}

fn default_upcoming_days() -> i64 {
    DEFAULT_UPCOMING_DAYS
}

impl Default for EventKeepConfig {
    fn default() -> Self {
        Self {
            group_id: default_group_id(),
            upcoming_days: default_upcoming_days(),
            refresh_command: Vec::new(),
        }
    }
}

impl EventKeepConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(EventKeepError::Io)?;
        let config: EventKeepConfig = serde_json::from_str(&content)
            .map_err(|e| EventKeepError::Config(format!("{}: {}", config_path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(EventKeepError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| EventKeepError::Config(e.to_string()))?;
        fs::write(config_path, content).map_err(EventKeepError::Io)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.group_id.trim().is_empty()
            || self.group_id.starts_with('.')
            || self.group_id.contains(['/', '\\'])
        {
            return Err(EventKeepError::Config(format!(
                "invalid group_id {:?}",
                self.group_id
            )));
        }
        if self.upcoming_days < 0 {
            return Err(EventKeepError::Config(
                "upcoming_days cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EventKeepConfig::default();
        assert_eq!(config.group_id, DEFAULT_GROUP_ID);
        assert_eq!(config.upcoming_days, 7);
        assert!(config.refresh_command.is_empty());
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = EventKeepConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, EventKeepConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = EventKeepConfig {
            group_id: "group.test".to_string(),
            upcoming_days: 14,
            refresh_command: vec!["true".to_string()],
        };
        config.save(temp_dir.path()).unwrap();

        let loaded = EventKeepConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILENAME), r#"{"upcoming_days": 3}"#).unwrap();

        let loaded = EventKeepConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.upcoming_days, 3);
        assert_eq!(loaded.group_id, DEFAULT_GROUP_ID);
    }

    #[test]
    fn test_rejects_bad_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            r#"{"group_id": "../escape"}"#,
        )
        .unwrap();
        assert!(matches!(
            EventKeepConfig::load(temp_dir.path()),
            Err(EventKeepError::Config(_))
        ));

        fs::write(temp_dir.path().join(CONFIG_FILENAME), "not json").unwrap();
        assert!(EventKeepConfig::load(temp_dir.path()).is_err());
    }
}

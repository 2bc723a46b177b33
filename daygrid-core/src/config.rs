//! Global daygrid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calendar_id::CalendarId;
use crate::error::{DayGridError, DayGridResult};
use config::{Config, File};

/// Global configuration at ~/.config/daygrid/config.toml
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct GlobalConfig {
    /// Calendar this machine reads and writes. Generated and persisted on
    /// first run; replaced by `daygrid open`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,

    /// Override for the local data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Remote backend settings. Absent means local-only storage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

/// Connection settings for the remote `events` table.
#[derive(Serialize, Deserialize, Clone)]
pub struct RemoteConfig {
    /// Base URL of the REST endpoint exposing the events table.
    pub url: String,

    /// API key, sent both as `apikey` and as a bearer token.
    pub api_key: String,

    /// Seconds between change-feed polls.
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

fn default_poll_secs() -> u64 {
    5
}

impl GlobalConfig {
    pub fn config_path() -> DayGridResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DayGridError::Config("Could not determine config directory".into()))?
            .join("daygrid");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config, creating a commented default file on first run.
    pub fn load() -> DayGridResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        let config: GlobalConfig = Config::builder()
            .add_source(File::from(config_path).required(false))
            .build()
            .map_err(|e| DayGridError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DayGridError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Save the current config to ~/.config/daygrid/config.toml
    pub fn save(&self) -> DayGridResult<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DayGridError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| DayGridError::Config(e.to_string()))?;

        std::fs::write(&config_path, content)
            .map_err(|e| DayGridError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DayGridResult<()> {
        let contents = "\
# daygrid configuration

# Calendar id shared through `daygrid share`. Generated automatically on
# first use; set it by hand to join an existing calendar.
# calendar = \"…\"

# Where local calendar data lives:
# data_dir = \"~/.local/share/daygrid\"

# Remote backend. Without this section, events stay on this machine.
# [remote]
# url = \"https://example.supabase.co/rest/v1\"
# api_key = \"…\"
# poll_secs = 5
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DayGridError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DayGridError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Expanded data directory (default ~/.local/share/daygrid).
    pub fn data_path(&self) -> DayGridResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => {
                let expanded = shellexpand::tilde(&dir.to_string_lossy()).into_owned();
                Ok(PathBuf::from(expanded))
            }
            None => Ok(dirs::data_dir()
                .ok_or_else(|| DayGridError::Config("Could not determine data directory".into()))?
                .join("daygrid")),
        }
    }

    /// Resolve the calendar id: flag override, configured id, or a freshly
    /// generated one persisted back so later runs and share links agree.
    ///
    /// A flag override is deliberately not persisted.
    pub fn resolve_calendar(&mut self, flag: Option<&str>) -> DayGridResult<CalendarId> {
        if let Some(id) = flag {
            return CalendarId::new(id);
        }
        if let Some(id) = &self.calendar {
            return CalendarId::new(id);
        }

        let id = CalendarId::generate();
        log::info!("Generated new calendar id {id}");
        self.calendar = Some(id.as_str().to_string());
        self.save()?;
        Ok(id)
    }

    /// Adopt a calendar id (from `daygrid open`) and persist it.
    pub fn set_calendar(&mut self, id: &CalendarId) -> DayGridResult<()> {
        self.calendar = Some(id.as_str().to_string());
        self.save()
    }
}

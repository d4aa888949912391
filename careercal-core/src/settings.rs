//! User settings.
//!
//! Layered, lowest priority first: built-in defaults, then
//! `~/.config/careercal/config.toml`, then `CAREERCAL_*` environment variables
//! (e.g. `CAREERCAL_MAX_INSTANCES=100`).

use std::path::{Path, PathBuf};

use chrono::Duration;
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::draft::{DEFAULT_CONFIDENCE_THRESHOLD, DraftOptions};
use crate::error::{CalResult, CalendarError};
use crate::recurrence::DEFAULT_MAX_INSTANCES;
use crate::reminder::DEFAULT_GRACE_MINUTES;

static DEFAULT_EVENTS_FILE: &str = "~/.local/share/careercal/events.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON file the CLI keeps events in
    pub events_file: PathBuf,
    /// Timezone for new events and for "today" in stats
    pub timezone: Tz,
    pub max_instances: usize,
    pub draft_confidence_threshold: f64,
    /// How long after an event starts its reminders are still delivered
    pub reminder_grace_minutes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            events_file: PathBuf::from(DEFAULT_EVENTS_FILE),
            timezone: local_timezone(),
            max_instances: DEFAULT_MAX_INSTANCES,
            draft_confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            reminder_grace_minutes: DEFAULT_GRACE_MINUTES,
        }
    }
}

/// The system timezone, or UTC when it can't be determined
pub fn local_timezone() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse().ok())
        .unwrap_or(Tz::UTC)
}

impl Settings {
    pub fn config_path() -> CalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalendarError::Config("Could not determine config directory".into()))?
            .join("careercal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented config file on
    /// first run.
    pub fn load() -> CalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> CalResult<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("CAREERCAL").try_parsing(true))
            .build()
            .map_err(|e| CalendarError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalendarError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> CalResult<()> {
        if !(0.0..=1.0).contains(&self.draft_confidence_threshold) {
            return Err(CalendarError::Config(format!(
                "draft_confidence_threshold must be between 0 and 1, got {}",
                self.draft_confidence_threshold
            )));
        }
        if self.reminder_grace_minutes < 0 {
            return Err(CalendarError::Config(format!(
                "reminder_grace_minutes must not be negative, got {}",
                self.reminder_grace_minutes
            )));
        }
        Ok(())
    }

    /// `events_file` with `~` expanded
    pub fn events_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.events_file.to_string_lossy()).into_owned())
    }

    pub fn reminder_grace(&self) -> Duration {
        Duration::minutes(self.reminder_grace_minutes)
    }

    pub fn draft_options(&self, created_by: impl Into<String>) -> DraftOptions {
        DraftOptions {
            confidence_threshold: self.draft_confidence_threshold,
            timezone: self.timezone,
            created_by: created_by.into(),
        }
    }

    pub fn to_toml(&self) -> CalResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalendarError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalResult<()> {
        let contents = format!(
            "\
# careercal configuration
# Every setting can also be given as an environment variable,
# e.g. CAREERCAL_TIMEZONE=Europe/Berlin

# Where events are stored:
# events_file = \"{}\"

# Timezone for new events and for \"today\" (defaults to the system timezone):
# timezone = \"America/New_York\"

# Most instances a recurring event expands to:
# max_instances = {}

# Drafts below this confidence are rejected:
# draft_confidence_threshold = {}

# Reminders for events that started longer ago than this are skipped:
# reminder_grace_minutes = {}
",
            DEFAULT_EVENTS_FILE,
            DEFAULT_MAX_INSTANCES,
            DEFAULT_CONFIDENCE_THRESHOLD,
            DEFAULT_GRACE_MINUTES
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalendarError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalendarError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("careercal").join("config.toml");

        Settings::create_default_config(&path).unwrap();
        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.max_instances, 52);
        assert_eq!(settings.draft_confidence_threshold, 0.7);
        assert_eq!(settings.reminder_grace(), Duration::minutes(60));
        assert_eq!(settings.events_file, PathBuf::from(DEFAULT_EVENTS_FILE));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "timezone = \"Asia/Tokyo\"\nmax_instances = 10\nevents_file = \"/tmp/events.json\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.timezone, chrono_tz::Asia::Tokyo);
        assert_eq!(settings.max_instances, 10);
        assert_eq!(settings.events_path(), PathBuf::from("/tmp/events.json"));
        assert_eq!(settings.draft_options("cli").timezone, chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "draft_confidence_threshold = 1.5\n").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(CalendarError::Config(_))));

        std::fs::write(&path, "timezone = \"Mars/Olympus\"\n").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(CalendarError::Config(_))));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let settings = Settings {
            timezone: chrono_tz::Europe::Helsinki,
            max_instances: 12,
            ..Default::default()
        };

        std::fs::write(&path, settings.to_toml().unwrap()).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_tilde_is_expanded() {
        let settings = Settings::default();

        assert!(!settings.events_path().to_string_lossy().starts_with('~'));
    }
}

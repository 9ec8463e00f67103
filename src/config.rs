//! Deployment configuration file support.
//!
//! This module provides utilities for reading core configuration from TOML
//! configuration files. The important knob is the deployment time zone: slot
//! windows are wall-clock times, and every operation timestamp crossing the
//! API is UTC, so the configured offset is what ties the two together. The
//! offset is fixed per deployment and must stay consistent across all
//! operations.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::repository::RepositoryError;
use crate::models::TimeSlot;

/// Core configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub clock: ClockSettings,
    #[serde(default)]
    pub repository: RepositorySettings,
}

/// Deployment clock settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ClockSettings {
    /// Offset of the deployment's wall clock from UTC, in minutes.
    /// 0 = UTC, 330 = IST, -300 = EST.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

/// Repository backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
        }
    }
}

fn default_repo_type() -> String {
    "local".to_string()
}

impl CoreConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(CoreConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config: CoreConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `core.toml` in the current directory, then the parent
    /// directory. Falls back to defaults (UTC, local repository) when no file
    /// exists.
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = vec![PathBuf::from("core.toml"), PathBuf::from("../core.toml")];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Convert a wall-clock moment of the deployment zone to UTC.
    pub fn local_to_utc(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let naive = date.and_time(time) - Duration::minutes(i64::from(self.clock.utc_offset_minutes));
        DateTime::from_naive_utc_and_offset(naive, Utc)
    }

    /// The UTC window `[start, end]` of `slot` on `date`.
    pub fn slot_window(&self, date: NaiveDate, slot: &TimeSlot) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.local_to_utc(date, slot.start_time),
            self.local_to_utc(date, slot.end_time),
        )
    }
}

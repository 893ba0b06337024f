//! Configuration management
//!
//! Reads settings.json from the Navkar directory:
//! ```json
//! {
//!   "auth": { "loginDelayMs": 1000, "signupDelayMs": 1500, "confirmationDelayMs": 1500 },
//!   "location": {
//!     "enableHighAccuracy": true, "timeoutMs": 10000, "maximumAgeMs": 300000,
//!     "fixed": { "latitude": 19.076, "longitude": 72.8777, "accuracy": 20 }
//!   }
//! }
//! ```
//! Keys this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::mock_verifier::MockLatency;
use crate::domain::{Position, PositionOptions};

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    auth: AuthSettings,
    #[serde(default)]
    location: LocationSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSettings {
    pub login_delay_ms: u64,
    pub signup_delay_ms: u64,
    pub confirmation_delay_ms: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            login_delay_ms: 1000,
            signup_delay_ms: 1500,
            confirmation_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationSettings {
    pub enable_high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<Position>,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 300_000,
            fixed: None,
        }
    }
}

/// Navkar configuration (settings plus environment overrides)
#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthSettings,
    pub location: LocationSettings,
    /// NAVKAR_MOCK_LATENCY=0 turns every simulated delay off
    pub mock_latency_enabled: bool,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(SettingsFile::default(), None, None)
    }
}

impl Config {
    /// Load config from the Navkar directory
    ///
    /// Environment overrides:
    /// 1. NAVKAR_MOCK_LATENCY (`0`/`false` disables delays, for CI/scripting)
    /// 2. NAVKAR_LOCATION (`lat,lon[,accuracy]`) replaces the fixed location
    pub fn load(navkar_dir: &Path) -> Result<Self> {
        let settings_path = navkar_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        Ok(Self::from_settings(
            raw,
            std::env::var("NAVKAR_MOCK_LATENCY").ok().as_deref(),
            std::env::var("NAVKAR_LOCATION").ok().as_deref(),
        ))
    }

    fn from_settings(raw: SettingsFile, latency_env: Option<&str>, location_env: Option<&str>) -> Self {
        let mock_latency_enabled = !matches!(
            latency_env,
            Some("false" | "0" | "no" | "off" | "FALSE" | "NO" | "OFF")
        );

        let mut location = raw.location.clone();
        if let Some(position) = location_env.and_then(Position::parse) {
            location.fixed = Some(position);
        }

        Self {
            auth: raw.auth.clone(),
            location,
            mock_latency_enabled,
            _raw_settings: raw,
        }
    }

    /// Save config to the Navkar directory
    /// Preserves other settings this crate doesn't manage
    pub fn save(&self, navkar_dir: &Path) -> Result<()> {
        let settings_path = navkar_dir.join(SETTINGS_FILE);

        // Load existing settings to preserve fields we don't manage
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.auth = self.auth.clone();
        settings.location = self.location.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }

    /// Delays for the mock credential backend
    pub fn mock_latency(&self) -> MockLatency {
        if !self.mock_latency_enabled {
            return MockLatency::none();
        }
        MockLatency {
            login: Duration::from_millis(self.auth.login_delay_ms),
            signup: Duration::from_millis(self.auth.signup_delay_ms),
        }
    }

    /// How long a success message stays up before the modal closes
    pub fn confirmation_delay(&self) -> Duration {
        if !self.mock_latency_enabled {
            return Duration::ZERO;
        }
        Duration::from_millis(self.auth.confirmation_delay_ms)
    }

    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: self.location.enable_high_accuracy,
            timeout: Duration::from_millis(self.location.timeout_ms),
            maximum_age: Duration::from_millis(self.location.maximum_age_ms),
        }
    }

    pub fn fixed_location(&self) -> Option<Position> {
        self.location.fixed.filter(Position::is_valid)
    }
}

//! Delivery location domain model

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A position fix; accuracy is in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
        }
    }

    /// Parse `lat,lon[,accuracy]`
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        let position = match parts.as_slice() {
            [lat, lon] => Self::new(*lat, *lon, 0.0),
            [lat, lon, acc] => Self::new(*lat, *lon, *acc),
            _ => return None,
        };
        position.is_valid().then_some(position)
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
            && self.accuracy >= 0.0
    }

    /// Header text once a fix is known, 2 decimal places
    pub fn summary(&self) -> String {
        format!("Location Set ({:.2}, {:.2})", self.latitude, self.longitude)
    }

    /// Confirmed delivery location text, 4 decimal places
    pub fn confirmation(&self) -> String {
        format!(
            "Current Location ({:.4}, {:.4})",
            self.latitude, self.longitude
        )
    }
}

/// Options for a position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// A cached fix younger than this may be returned instead of a new one
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(10_000),
            maximum_age: Duration::from_millis(300_000),
        }
    }
}

/// Why no position could be obtained
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timeout expired")]
    Timeout,

    #[error("{0}")]
    Unknown(String),
}

impl GeolocationError {
    /// Classify a numeric platform error code (1, 2, 3; anything else is unknown)
    pub fn from_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            2 => GeolocationError::PositionUnavailable,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::Unknown(message.into()),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            GeolocationError::PermissionDenied => 1,
            GeolocationError::PositionUnavailable => 2,
            GeolocationError::Timeout => 3,
            GeolocationError::Unknown(_) => 0,
        }
    }

    /// User-facing guidance text
    pub fn guidance(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Permission denied. Please enable location access in your browser settings and try again."
            }
            GeolocationError::PositionUnavailable => {
                "Location unavailable. Please check your internet connection and try again."
            }
            GeolocationError::Timeout => "Location request timed out. Please try again.",
            GeolocationError::Unknown(_) => {
                "Could not get location. Please ensure location services are enabled and try again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_uses_four_decimals() {
        let position = Position::new(19.076_09, 72.877_426, 25.0);
        assert_eq!(position.confirmation(), "Current Location (19.0761, 72.8774)");
        assert_eq!(position.summary(), "Location Set (19.08, 72.88)");
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(
            Position::parse("19.07, 72.87"),
            Some(Position::new(19.07, 72.87, 0.0))
        );
        assert_eq!(
            Position::parse("19.07,72.87,30"),
            Some(Position::new(19.07, 72.87, 30.0))
        );
        assert_eq!(Position::parse("north"), None);
        assert_eq!(Position::parse("95.0,10.0"), None);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(GeolocationError::from_code(1, ""), GeolocationError::PermissionDenied);
        assert_eq!(GeolocationError::from_code(3, ""), GeolocationError::Timeout);
        assert_eq!(
            GeolocationError::from_code(9, "boom"),
            GeolocationError::Unknown("boom".to_string())
        );
        assert!(GeolocationError::Timeout.guidance().contains("timed out"));
    }

    #[test]
    fn test_default_options() {
        let options = PositionOptions::default();
        assert!(options.enable_high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::from_secs(300));
    }
}

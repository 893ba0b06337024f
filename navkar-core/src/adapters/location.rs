//! Location providers
//!
//! - `FixedLocationProvider`: a configured position (settings or NAVKAR_LOCATION)
//! - `UnsupportedLocationProvider`: no positioning available on this host

use async_trait::async_trait;

use crate::domain::{GeolocationError, Position, PositionOptions};
use crate::ports::LocationProvider;

pub struct FixedLocationProvider {
    position: Position,
}

impl FixedLocationProvider {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Position, GeolocationError> {
        Ok(self.position)
    }
}

#[derive(Debug, Default)]
pub struct UnsupportedLocationProvider;

#[async_trait]
impl LocationProvider for UnsupportedLocationProvider {
    fn name(&self) -> &str {
        "unsupported"
    }

    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Position, GeolocationError> {
        Err(GeolocationError::Unknown(
            "Geolocation is not supported on this device.".to_string(),
        ))
    }
}

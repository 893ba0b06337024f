//! Location provider port - source of position fixes

use async_trait::async_trait;

use crate::domain::{GeolocationError, Position, PositionOptions};

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Provider name (e.g., "fixed")
    fn name(&self) -> &str;

    /// Obtain the current position
    ///
    /// Providers may ignore `options`; the location service enforces the
    /// timeout and maximum age itself.
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Position, GeolocationError>;
}

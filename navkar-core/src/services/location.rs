//! Location service - delivery location lookup and confirmation text

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::time::{timeout, Instant};

use crate::domain::{GeolocationError, Position, PositionOptions};
use crate::ports::LocationProvider;
use crate::services::logging::{record, LogEvent, LogFlow, LoggingService};

const NO_LOCATION_TEXT: &str = "Select your location";

/// Snapshot of what the location picker shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStatus {
    pub position: Option<Position>,
    pub confirmed: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Default)]
struct LocationState {
    status: LocationStatus,
    fetched_at: Option<Instant>,
}

pub struct LocationService {
    provider: Arc<dyn LocationProvider>,
    options: PositionOptions,
    state: Mutex<LocationState>,
    logger: Option<Arc<LoggingService>>,
}

impl LocationService {
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        options: PositionOptions,
        logger: Option<Arc<LoggingService>>,
    ) -> Self {
        Self {
            provider,
            options,
            state: Mutex::new(LocationState::default()),
            logger,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LocationState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn status(&self) -> LocationStatus {
        self.lock().status.clone()
    }

    /// Ask the provider for the current position
    ///
    /// A fix younger than `maximum_age` is reused. A provider slower than
    /// `timeout` fails with [`GeolocationError::Timeout`]. On failure the
    /// previous fix is forgotten and the guidance text is kept as the status
    /// error message.
    pub async fn request_location(&self) -> Result<Position, GeolocationError> {
        {
            let state = self.lock();
            if let (Some(position), Some(fetched_at)) = (state.status.position, state.fetched_at) {
                if fetched_at.elapsed() < self.options.maximum_age {
                    return Ok(position);
                }
            }
        }

        let result = match timeout(
            self.options.timeout,
            self.provider.current_position(&self.options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GeolocationError::Timeout),
        };

        let mut state = self.lock();
        match &result {
            Ok(position) => {
                state.status.position = Some(*position);
                state.status.error_message = None;
                state.fetched_at = Some(Instant::now());
            }
            Err(e) => {
                // A failed refresh drops the old fix; a confirmed location stays
                state.status.position = None;
                state.fetched_at = None;
                state.status.error_message = Some(e.guidance().to_string());
                drop(state);
                record(
                    self.logger.as_deref(),
                    LogEvent::new(LogFlow::Location, "location_failed")
                        .with_error(format!("geolocation_{}", e.code()), e.to_string()),
                );
            }
        }
        result
    }

    /// Header text: the confirmed location, else the last fix, else a prompt
    pub fn display_text(&self) -> String {
        let state = self.lock();
        if let Some(confirmed) = &state.status.confirmed {
            return confirmed.clone();
        }
        state
            .status
            .position
            .map(|p| p.summary())
            .unwrap_or_else(|| NO_LOCATION_TEXT.to_string())
    }

    /// Confirm the last fix as the delivery location
    ///
    /// Returns `None` when no position has been obtained yet.
    pub fn confirm_location(&self) -> Option<String> {
        let mut state = self.lock();
        let text = state.status.position?.confirmation();
        state.status.confirmed = Some(text.clone());
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::location::{FixedLocationProvider, UnsupportedLocationProvider};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowProvider {
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LocationProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Position, GeolocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(Position::new(12.9716, 77.5946, 10.0))
        }
    }

    #[tokio::test]
    async fn test_display_and_confirm() {
        let service = LocationService::new(
            Arc::new(FixedLocationProvider::new(Position::new(19.07609, 72.877426, 5.0))),
            PositionOptions::default(),
            None,
        );
        assert_eq!(service.display_text(), "Select your location");
        assert_eq!(service.confirm_location(), None);

        service.request_location().await.unwrap();
        assert_eq!(service.display_text(), "Location Set (19.08, 72.88)");

        let confirmed = service.confirm_location().unwrap();
        assert_eq!(confirmed, "Current Location (19.0761, 72.8774)");
        assert_eq!(service.display_text(), confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let provider = Arc::new(SlowProvider {
            delay: Duration::from_secs(30),
            calls: AtomicUsize::new(0),
        });
        let service = LocationService::new(provider, PositionOptions::default(), None);

        let err = service.request_location().await.unwrap_err();
        assert_eq!(err, GeolocationError::Timeout);
        assert_eq!(
            service.status().error_message.as_deref(),
            Some("Location request timed out. Please try again.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_recent_fix_is_reused() {
        let provider = Arc::new(SlowProvider {
            delay: Duration::from_millis(100),
            calls: AtomicUsize::new(0),
        });
        let service = LocationService::new(provider.clone(), PositionOptions::default(), None);

        service.request_location().await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        service.request_location().await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(300)).await;
        service.request_location().await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unsupported_provider_guidance() {
        let service = LocationService::new(
            Arc::new(UnsupportedLocationProvider),
            PositionOptions::default(),
            None,
        );
        let err = service.request_location().await.unwrap_err();
        assert!(matches!(err, GeolocationError::Unknown(_)));
        assert_eq!(service.display_text(), "Select your location");
        assert!(service
            .status()
            .error_message
            .unwrap()
            .starts_with("Could not get location"));
    }

    /// Succeeds once, then reports permission denied
    struct RevokedProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LocationProvider for RevokedProvider {
        fn name(&self) -> &str {
            "revoked"
        }

        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Position, GeolocationError> {
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => Ok(Position::new(19.07609, 72.877426, 5.0)),
                _ => Err(GeolocationError::PermissionDenied),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_forgets_expired_fix() {
        let service = LocationService::new(
            Arc::new(RevokedProvider {
                calls: AtomicUsize::new(0),
            }),
            PositionOptions::default(),
            None,
        );

        service.request_location().await.unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;

        let err = service.request_location().await.unwrap_err();
        assert_eq!(err, GeolocationError::PermissionDenied);
        assert_eq!(service.status().position, None);
        assert_eq!(service.confirm_location(), None);
        assert_eq!(service.display_text(), "Select your location");
    }
}

//! Navkar Core - sign-in session model for the Navkar grocery storefront
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Identity, Session State, form validation, Position)
//! - **ports**: Trait definitions for external dependencies (KeyValueStore, CredentialVerifier, LocationProvider)
//! - **services**: Business logic orchestration (SessionStore, AuthFlowController, LocationService)
//! - **adapters**: Concrete implementations (DuckDB storage, mock verifier, location providers)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;
pub mod log_migrations;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbStorage;
use adapters::location::{FixedLocationProvider, UnsupportedLocationProvider};
use adapters::mock_verifier::MockCredentialVerifier;
use config::Config;
use ports::LocationProvider;
use services::*;

// Re-export commonly used types at crate root
pub use domain::{Identity, LoginRequest, Position, SignupRequest};
pub use domain::result::{AuthError, Error, OperationResult};

/// Main context for Navkar operations
///
/// This is the primary entry point for all business logic. It holds the
/// storage, configuration, and all services.
pub struct NavkarContext {
    pub config: Config,
    pub storage: Arc<DuckDbStorage>,
    pub session_store: Arc<SessionStore>,
    pub location_service: LocationService,
    pub logger: Option<Arc<LoggingService>>,
}

impl NavkarContext {
    /// Create a new Navkar context
    ///
    /// Opens storage.duckdb in `navkar_dir` and restores any persisted
    /// session before returning.
    pub fn new(navkar_dir: &Path, logger: Option<LoggingService>) -> Result<Self> {
        std::fs::create_dir_all(navkar_dir)
            .with_context(|| format!("Failed to create {}", navkar_dir.display()))?;
        let config = Config::load(navkar_dir)?;
        let logger = logger.map(Arc::new);

        let storage = Arc::new(DuckDbStorage::open(&navkar_dir.join("storage.duckdb"))?);
        let verifier = Arc::new(MockCredentialVerifier::new(config.mock_latency()));
        let session_store = Arc::new(SessionStore::open(
            storage.clone(),
            verifier,
            logger.clone(),
        ));

        let provider: Arc<dyn LocationProvider> = match config.fixed_location() {
            Some(position) => Arc::new(FixedLocationProvider::new(position)),
            None => Arc::new(UnsupportedLocationProvider),
        };
        let location_service =
            LocationService::new(provider, config.position_options(), logger.clone());

        Ok(Self {
            config,
            storage,
            session_store,
            location_service,
            logger,
        })
    }

    /// A controller for the sign-in modal over this context's session store
    pub fn auth_flow(
        &self,
    ) -> (AuthFlowController, tokio::sync::mpsc::UnboundedReceiver<AuthEvent>) {
        AuthFlowController::new(
            Arc::clone(&self.session_store),
            self.config.confirmation_delay(),
        )
    }
}

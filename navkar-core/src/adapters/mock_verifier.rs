//! Mock credential verifier
//!
//! Simulates the account backend: a fixed network delay, then a check
//! against the single demo account. Signups are always admitted and given
//! a fresh id; the session store applies the password and uniqueness rules.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::result::AuthError;
use crate::domain::{
    generate_identity_id, Identity, LoginRequest, SignupRequest, DEMO_ADDRESS, DEMO_EMAIL,
    DEMO_ID, DEMO_NAME, DEMO_PASSWORD, DEMO_PHONE,
};
use crate::ports::CredentialVerifier;

/// Simulated latency for the mock backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLatency {
    pub login: Duration,
    pub signup: Duration,
}

impl Default for MockLatency {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(1000),
            signup: Duration::from_millis(1500),
        }
    }
}

impl MockLatency {
    /// No delay at all (CI, scripted use)
    pub fn none() -> Self {
        Self {
            login: Duration::ZERO,
            signup: Duration::ZERO,
        }
    }
}

pub struct MockCredentialVerifier {
    latency: MockLatency,
}

impl MockCredentialVerifier {
    pub fn new(latency: MockLatency) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> MockLatency {
        self.latency
    }

    fn demo_identity(email: &str) -> Identity {
        Identity::new(DEMO_ID, DEMO_NAME, email, DEMO_PHONE).with_address(Some(DEMO_ADDRESS))
    }
}

impl Default for MockCredentialVerifier {
    fn default() -> Self {
        Self::new(MockLatency::default())
    }
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl CredentialVerifier for MockCredentialVerifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn authenticate(&self, request: &LoginRequest) -> Result<Identity, AuthError> {
        simulate_latency(self.latency.login).await;

        if request.email == DEMO_EMAIL && request.password == DEMO_PASSWORD {
            Ok(Self::demo_identity(&request.email))
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn register(&self, _request: &SignupRequest) -> Result<String, AuthError> {
        simulate_latency(self.latency.signup).await;
        Ok(generate_identity_id())
    }
}

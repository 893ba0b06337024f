//! Credential verifier port
//!
//! Defines how login and signup requests are checked against an account
//! backend. The session store only talks to this trait, so the mock
//! verifier can be swapped for a real HTTP backend without changing the
//! store's contract.

use async_trait::async_trait;

use crate::domain::result::AuthError;
use crate::domain::{Identity, LoginRequest, SignupRequest};

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Backend name (e.g., "mock")
    fn name(&self) -> &str;

    /// Check a login request, returning the account's identity
    async fn authenticate(&self, request: &LoginRequest) -> Result<Identity, AuthError>;

    /// Admit a signup request, returning the id assigned to the new account
    ///
    /// Password confirmation, length and e-mail uniqueness are enforced by
    /// the session store after this returns.
    async fn register(&self, request: &SignupRequest) -> Result<String, AuthError>;
}

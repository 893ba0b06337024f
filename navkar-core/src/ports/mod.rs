//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod credential_verifier;
mod location_provider;
mod storage;

pub use credential_verifier::CredentialVerifier;
pub use location_provider::LocationProvider;
pub use storage::KeyValueStore;

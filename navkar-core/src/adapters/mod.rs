//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB and in-memory maps for the KeyValueStore port
//! - Mock account backend for the CredentialVerifier port
//! - Fixed / unsupported providers for the LocationProvider port

pub mod duckdb;
pub mod location;
pub mod memory;
pub mod mock_verifier;

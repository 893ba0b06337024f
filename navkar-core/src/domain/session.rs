//! Session state and its persisted representation

use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// Storage key holding the serialized current identity
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Storage key holding the opaque session token
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Storage key of the per-email registration record
pub fn registered_user_key(email: &str) -> String {
    format!("user_{}", email)
}

/// Current login flag + identity pair
///
/// `logged_in` is true iff `identity` is present; the only constructors are
/// the two states below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    identity: Option<Identity>,
    logged_in: bool,
}

impl SessionState {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            logged_in: true,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }
}

/// Success branch of login and signup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSuccess {
    pub message: String,
    pub identity: Identity,
    pub token: String,
}

/// Result of reading the persisted record at start-up
///
/// Distinguishes "nothing stored" from "stored but unreadable".
#[derive(Debug, Clone, Default, Serialize)]
pub struct RestoreOutcome {
    pub identity: Option<Identity>,
    /// Present if a record existed but was corrupt or incomplete
    pub corruption_error: Option<String>,
}

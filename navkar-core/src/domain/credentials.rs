//! Sign-in request payloads and the demo account

use serde::{Deserialize, Serialize};

/// Minimum password length accepted at login and signup
pub const MIN_PASSWORD_LEN: usize = 6;

/// The single account the mock verifier accepts
pub const DEMO_EMAIL: &str = "demo@navkarbesan.com";
pub const DEMO_PASSWORD: &str = "password123";
pub const DEMO_ID: &str = "1";
pub const DEMO_NAME: &str = "Demo User";
pub const DEMO_PHONE: &str = "+91 98765 43210";
pub const DEMO_ADDRESS: &str = "123 Demo Street, Demo City";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Login fields pre-filled with the demo account
    pub fn demo() -> Self {
        Self::new(DEMO_EMAIL, DEMO_PASSWORD)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl SignupRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

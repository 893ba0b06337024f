//! Identity domain model

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a process-unique identity ID based on timestamp + counter
///
/// The lower 16 bits carry the counter so two identities created in the
/// same millisecond never collide.
pub fn generate_identity_id() -> String {
    let timestamp = Utc::now().timestamp_millis().max(0) as u64;
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    ((timestamp << 16) | counter).to_string()
}

/// The authenticated user's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            address: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a delivery address; blank addresses are treated as absent
    pub fn with_address(mut self, address: Option<&str>) -> Self {
        self.address = address
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        self
    }

    /// First word of the name, for greetings
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_json_round_trip() {
        let identity = Identity::new("42", "Asha Patel", "asha@x.com", "9876543210")
            .with_address(Some("12 Market Road"));

        let json = serde_json::to_string(&identity).unwrap();
        assert!(json.contains("\"createdAt\""));

        let restored: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, identity);
    }

    #[test]
    fn test_blank_address_is_absent() {
        let identity = Identity::new("1", "Asha", "asha@x.com", "9876543210").with_address(Some("  "));
        assert!(identity.address.is_none());

        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("address"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: std::collections::HashSet<String> =
            (0..1000).map(|_| generate_identity_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_first_name() {
        let identity = Identity::new("1", "Demo User", "demo@navkarbesan.com", "+91 98765 43210");
        assert_eq!(identity.first_name(), "Demo");
    }
}

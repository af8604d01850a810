use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity a submission is scoped to: network address plus the per-tab
/// session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitorKey {
    pub network_address: String,
    pub session_id: String,
}

impl VisitorKey {
    pub fn new(network_address: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            network_address: network_address.into(),
            session_id: session_id.into(),
        }
    }

    /// Visitor whose address could not be determined
    pub fn unknown(session_id: impl Into<String>) -> Self {
        Self::new("unknown", session_id)
    }

    /// Opaque storage key. Stores index submissions by this value.
    pub fn as_key(&self) -> String {
        format!("{}#{}", self.network_address, self.session_id)
    }
}

impl fmt::Display for VisitorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

//! Persisted identity and attributes of a reconciled application version.

use serde::{Deserialize, Serialize};

/// The record the orchestrator persists for a reconciled resource.
///
/// Only the reconciler produces records; identity is the version ARN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Registry identifier of the version
    pub version_arn: String,
    /// Label the version was registered or adopted under
    pub version_label: String,
}

impl ResourceRecord {
    /// Resource identity.
    pub fn id(&self) -> &str {
        &self.version_arn
    }
}

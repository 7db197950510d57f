use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::ApplicationId;

/// Who performed an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditActor {
    System,
    Admin,
}

impl AuditActor {
    pub const fn label(self) -> &'static str {
        match self {
            AuditActor::System => "System",
            AuditActor::Admin => "Admin",
        }
    }
}

/// Immutable audit record. Created on every state-changing action, never
/// updated or deleted.
///
/// `hash_id` is the derived correlation key; raw identity numbers must
/// never be written here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: String,
    pub actor: AuditActor,
    pub hash_id: String,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    pub recorded_at: DateTime<Utc>,
}

/// Audit sink error.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Append-only sink for audit entries.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
    /// Recent entries, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>, AuditError>;
}

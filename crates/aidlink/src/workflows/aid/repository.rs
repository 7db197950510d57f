use serde::{Deserialize, Serialize};

use super::domain::{AccountDetails, ApplicationId, ApplicationRecord, CitizenId, CitizenRecord};

/// Error enumeration for storage failures. The engine never retries; the
/// caller decides what to do with an unavailable store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup surface over the identity records owned by the onboarding
/// process.
pub trait CitizenDirectory: Send + Sync {
    fn find_by_mykad(&self, mykad_number: &str) -> Result<Option<CitizenRecord>, StoreError>;
    fn find_by_token(&self, session_token: &str) -> Result<Option<CitizenRecord>, StoreError>;
    fn find_by_id(&self, id: &CitizenId) -> Result<Option<CitizenRecord>, StoreError>;
    /// Set or clear the one-time session token on a citizen record.
    fn set_session_token(&self, id: &CitizenId, token: Option<String>) -> Result<(), StoreError>;
}

/// Storage abstraction for application aggregates so the service module can
/// be exercised in isolation.
pub trait ApplicationStore: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, StoreError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError>;
    /// All applications, newest first.
    fn all(&self) -> Result<Vec<ApplicationRecord>, StoreError>;
}

/// Instruction handed to the disbursement gateway. The gateway is a
/// simulation seam: real payment execution is out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOrder {
    pub recipient: String,
    pub amount: u32,
    pub account: AccountDetails,
    pub reference: String,
}

/// Transfer dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("transfer gateway unavailable: {0}")]
    Transport(String),
}

/// Outbound hook for the simulated funds transfer.
pub trait DisbursementGateway: Send + Sync {
    fn transfer(&self, order: TransferOrder) -> Result<(), TransferError>;
}

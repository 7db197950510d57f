use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::workflows::aid::audit::{AuditEntry, AuditError, AuditSink};
use crate::workflows::aid::domain::{
    AccountDetails, ApplicationId, ApplicationRecord, ApplicationStatus, CitizenId, CitizenRecord,
    IncomeBand, LinkedAccount,
};
use crate::workflows::aid::repository::{
    ApplicationStore, CitizenDirectory, DisbursementGateway, StoreError, TransferError,
    TransferOrder,
};
use crate::workflows::aid::risk::ApplicantHistory;
use crate::workflows::aid::service::AidService;
use crate::workflows::aid::ScreeningPolicy;

pub(super) const ALI_MYKAD: &str = "900101145000";
pub(super) const CHONG_MYKAD: &str = "950505106000";
pub(super) const SUBRA_MYKAD: &str = "881212147000";

pub(super) fn citizen(
    id: &str,
    mykad: &str,
    name: &str,
    income: u32,
    has_account: bool,
) -> CitizenRecord {
    CitizenRecord {
        id: CitizenId(id.to_string()),
        mykad_number: mykad.to_string(),
        full_name: name.to_string(),
        household_income: income,
        band: IncomeBand::classify(income),
        session_token: None,
        linked_account: LinkedAccount {
            has_account,
            bank_name: if has_account {
                "Maybank".to_string()
            } else {
                String::new()
            },
            account_number: if has_account {
                "1234567890".to_string()
            } else {
                String::new()
            },
        },
        created_at: Utc::now(),
    }
}

pub(super) fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    store.add_citizen(citizen("cit-ali", ALI_MYKAD, "Ali bin Abdullah", 1500, true));
    store.add_citizen(citizen("cit-chong", CHONG_MYKAD, "Chong Wei Ming", 4500, false));
    store.add_citizen(citizen(
        "cit-subra",
        SUBRA_MYKAD,
        "Subramanian Ramasamy",
        15000,
        true,
    ));
    store
}

pub(super) type TestService = AidService<MemoryStore, MemoryAudit, MemoryGateway>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryStore>,
    Arc<MemoryAudit>,
    Arc<MemoryGateway>,
) {
    let store = seeded_store();
    let audit = Arc::new(MemoryAudit::default());
    let gateway = Arc::new(MemoryGateway::default());
    let service = AidService::new(
        store.clone(),
        audit.clone(),
        gateway.clone(),
        ScreeningPolicy::default(),
    );
    (service, store, audit, gateway)
}

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(super) fn stored_application(
    citizen_id: &str,
    name: &str,
    status: ApplicationStatus,
) -> ApplicationRecord {
    let id = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationRecord {
        id: ApplicationId(format!("fixture-{id:04}")),
        citizen_id: CitizenId(citizen_id.to_string()),
        applicant_name: name.to_string(),
        program_name: "Cash Subsidy (STR)".to_string(),
        amount: 100,
        status,
        secret_code: if status == ApplicationStatus::Disbursed {
            Some("STR-0-ABCD1234".to_string())
        } else {
            None
        },
        disbursement_method: "Bank Transfer".to_string(),
        account_details: AccountDetails::default(),
        risk_score: 0,
        risk_factors: Vec::new(),
        is_auto_approved: false,
        reviewed_by: None,
        reviewed_at: None,
        review_seconds: None,
        region: "Selangor".to_string(),
        created_at: Utc::now() - Duration::minutes(5),
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    citizens: Mutex<HashMap<CitizenId, CitizenRecord>>,
    applications: Mutex<Vec<ApplicationRecord>>,
    fail_history: AtomicBool,
}

impl MemoryStore {
    pub(super) fn add_citizen(&self, record: CitizenRecord) {
        self.citizens
            .lock()
            .expect("citizen mutex poisoned")
            .insert(record.id.clone(), record);
    }

    pub(super) fn add_application(&self, record: ApplicationRecord) {
        self.applications
            .lock()
            .expect("application mutex poisoned")
            .push(record);
    }

    pub(super) fn fail_history_lookups(&self) {
        self.fail_history.store(true, Ordering::SeqCst);
    }

    pub(super) fn fetch_status(&self, id: &ApplicationId) -> Option<ApplicationStatus> {
        self.applications
            .lock()
            .expect("application mutex poisoned")
            .iter()
            .find(|record| &record.id == id)
            .map(|record| record.status)
    }

    pub(super) fn session_token_of(&self, id: &str) -> Option<String> {
        self.citizens
            .lock()
            .expect("citizen mutex poisoned")
            .get(&CitizenId(id.to_string()))
            .and_then(|record| record.session_token.clone())
    }
}

impl CitizenDirectory for MemoryStore {
    fn find_by_mykad(&self, mykad_number: &str) -> Result<Option<CitizenRecord>, StoreError> {
        let guard = self.citizens.lock().expect("citizen mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.mykad_number == mykad_number)
            .cloned())
    }

    fn find_by_token(&self, session_token: &str) -> Result<Option<CitizenRecord>, StoreError> {
        let guard = self.citizens.lock().expect("citizen mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.session_token.as_deref() == Some(session_token))
            .cloned())
    }

    fn find_by_id(&self, id: &CitizenId) -> Result<Option<CitizenRecord>, StoreError> {
        let guard = self.citizens.lock().expect("citizen mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn set_session_token(&self, id: &CitizenId, token: Option<String>) -> Result<(), StoreError> {
        let mut guard = self.citizens.lock().expect("citizen mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        record.session_token = token;
        Ok(())
    }
}

impl ApplicationStore for MemoryStore {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, StoreError> {
        let mut guard = self.applications.lock().expect("application mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(StoreError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), StoreError> {
        let mut guard = self.applications.lock().expect("application mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or(StoreError::NotFound)?;
        *slot = record;
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        let guard = self.applications.lock().expect("application mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn all(&self) -> Result<Vec<ApplicationRecord>, StoreError> {
        let guard = self.applications.lock().expect("application mutex poisoned");
        let mut records = guard.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

impl ApplicantHistory for MemoryStore {
    fn citizen(&self, id: &CitizenId) -> Result<Option<CitizenRecord>, StoreError> {
        self.find_by_id(id)
    }

    fn submissions_since(
        &self,
        id: &CitizenId,
        since: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("history offline".to_string()));
        }
        let guard = self.applications.lock().expect("application mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.citizen_id == id && record.created_at >= since)
            .count())
    }

    fn rejection_count(&self, id: &CitizenId) -> Result<usize, StoreError> {
        let guard = self.applications.lock().expect("application mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| {
                &record.citizen_id == id && record.status == ApplicationStatus::Rejected
            })
            .count())
    }

    fn matching_households(
        &self,
        income: u32,
        band: IncomeBand,
        excluding: &CitizenId,
    ) -> Result<usize, StoreError> {
        let guard = self.citizens.lock().expect("citizen mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| {
                record.household_income == income
                    && record.band == band
                    && &record.id != excluding
            })
            .count())
    }
}

#[derive(Default)]
pub(super) struct MemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    pub(super) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>, AuditError> {
        let guard = self.entries.lock().expect("audit mutex poisoned");
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryGateway {
    orders: Mutex<Vec<TransferOrder>>,
    fail_transfers: AtomicBool,
}

impl MemoryGateway {
    pub(super) fn orders(&self) -> Vec<TransferOrder> {
        self.orders.lock().expect("gateway mutex poisoned").clone()
    }

    pub(super) fn fail_transfers(&self) {
        self.fail_transfers.store(true, Ordering::SeqCst);
    }
}

impl DisbursementGateway for MemoryGateway {
    fn transfer(&self, order: TransferOrder) -> Result<(), TransferError> {
        if self.fail_transfers.load(Ordering::SeqCst) {
            return Err(TransferError::Transport("bank rail offline".to_string()));
        }
        self.orders
            .lock()
            .expect("gateway mutex poisoned")
            .push(order);
        Ok(())
    }
}

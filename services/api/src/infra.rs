use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use aidlink::workflows::aid::{
    ApplicantHistory, ApplicationId, ApplicationRecord, ApplicationStatus, ApplicationStore,
    AuditEntry, AuditError, AuditSink, CitizenDirectory, CitizenId, CitizenRecord,
    DisbursementGateway, IncomeBand, LinkedAccount, StoreError, TransferError, TransferOrder,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local citizen and application store. Stands in for the national
/// registry and the application database in demos and local runs.
#[derive(Default)]
pub(crate) struct InMemoryAidStore {
    citizens: Mutex<HashMap<CitizenId, CitizenRecord>>,
    applications: Mutex<Vec<ApplicationRecord>>,
}

impl CitizenDirectory for InMemoryAidStore {
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

impl ApplicationStore for InMemoryAidStore {
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

impl ApplicantHistory for InMemoryAidStore {
    fn citizen(&self, id: &CitizenId) -> Result<Option<CitizenRecord>, StoreError> {
        self.find_by_id(id)
    }

    fn submissions_since(
        &self,
        id: &CitizenId,
        since: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
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

/// Append-only audit log held in process memory.
#[derive(Default)]
pub(crate) struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditSink for InMemoryAuditLog {
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

/// Simulated bank rail: every transfer is acknowledged and logged, nothing
/// leaves the process.
#[derive(Default)]
pub(crate) struct LoggingBankGateway;

impl DisbursementGateway for LoggingBankGateway {
    fn transfer(&self, order: TransferOrder) -> Result<(), TransferError> {
        info!(
            recipient = %order.recipient,
            amount = order.amount,
            reference = %order.reference,
            "simulated bank transfer dispatched"
        );
        Ok(())
    }
}

fn persona(
    id: &str,
    mykad: &str,
    name: &str,
    income: u32,
    bank: Option<(&str, &str)>,
) -> CitizenRecord {
    let linked_account = match bank {
        Some((bank_name, account_number)) => LinkedAccount {
            has_account: true,
            bank_name: bank_name.to_string(),
            account_number: account_number.to_string(),
        },
        None => LinkedAccount::default(),
    };
    CitizenRecord {
        id: CitizenId(id.to_string()),
        mykad_number: mykad.to_string(),
        full_name: name.to_string(),
        household_income: income,
        band: IncomeBand::classify(income),
        session_token: None,
        linked_account,
        created_at: Utc::now(),
    }
}

/// Load the three demo personas, one per income band.
pub(crate) fn seed_personas(store: &InMemoryAidStore) {
    let seeds = [
        persona(
            "cit-0001",
            "900101145000",
            "Ali bin Abdullah",
            1500,
            Some(("Maybank", "1234567890")),
        ),
        persona("cit-0002", "950505106000", "Chong Wei Ming", 4500, None),
        persona(
            "cit-0003",
            "881212147000",
            "Subramanian Ramasamy",
            15000,
            Some(("CIMB", "9876543210")),
        ),
    ];

    let mut guard = store.citizens.lock().expect("citizen mutex poisoned");
    for record in seeds {
        guard.insert(record.id.clone(), record);
    }
}

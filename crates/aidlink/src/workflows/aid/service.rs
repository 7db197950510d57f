use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::audit::{AuditActor, AuditEntry, AuditError, AuditSink};
use super::domain::{
    AccountDetails, ApplicationId, ApplicationRecord, ApplicationStatus, CitizenRecord, IncomeBand,
};
use super::eligibility::{
    DecisionEngine, EligibilityScreen, ScreeningPolicy, SimulationResult, SubmissionRuling,
};
use super::identity;
use super::repository::{
    ApplicationStore, CitizenDirectory, DisbursementGateway, StoreError, TransferError,
    TransferOrder,
};
use super::risk::{self, ApplicantHistory, RiskAssessment};

/// Error raised by the aid service.
#[derive(Debug, thiserror::Error)]
pub enum AidServiceError {
    #[error("MyKad not found in system")]
    CitizenNotFound,
    #[error("invalid or expired session token")]
    InvalidSessionToken,
    #[error("application not found")]
    ApplicationNotFound,
    #[error("application already disbursed")]
    AlreadyDisbursed,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Verification response: the minted token plus the screen flags. The
/// declared income is intentionally absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub session_token: String,
    pub eligible: bool,
    pub requires_review: bool,
    pub full_name: String,
    pub band: IncomeBand,
}

/// Per-item failure inside a bulk operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub application_id: ApplicationId,
    pub reason: String,
}

/// Result of a bulk approve/reject pass. Items are processed independently
/// and sequentially; one failure never aborts or rolls back the others.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<ApplicationId>,
    pub failed: Vec<BulkFailure>,
}

/// Per-program tally for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramTally {
    pub program_name: String,
    pub count: usize,
}

/// Aggregate counters backing the admin dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_applications: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub disbursed: usize,
    pub funds_disbursed: u64,
    pub by_program: Vec<ProgramTally>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("aid-{id:06}"))
}

/// Service composing the decision engine, the storage seams, the audit
/// sink, and the simulated disbursement gateway.
pub struct AidService<S, L, G> {
    store: Arc<S>,
    audit: Arc<L>,
    gateway: Arc<G>,
    engine: DecisionEngine,
}

impl<S, L, G> AidService<S, L, G>
where
    S: CitizenDirectory + ApplicationStore + ApplicantHistory + 'static,
    L: AuditSink + 'static,
    G: DisbursementGateway + 'static,
{
    pub fn new(store: Arc<S>, audit: Arc<L>, gateway: Arc<G>, policy: ScreeningPolicy) -> Self {
        Self {
            store,
            audit,
            gateway,
            engine: DecisionEngine::new(policy),
        }
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Step 1 of the citizen flow: look up the identity, mint a one-time
    /// session token, and run the preliminary screen. The response carries
    /// the screen flags only, never the income.
    pub fn verify_eligibility(
        &self,
        mykad_number: &str,
    ) -> Result<VerificationOutcome, AidServiceError> {
        let citizen = self
            .store
            .find_by_mykad(mykad_number.trim())?
            .ok_or(AidServiceError::CitizenNotFound)?;

        let token = identity::session_token();
        self.store
            .set_session_token(&citizen.id, Some(token.clone()))?;

        let screen = self.engine.screen(citizen.household_income);
        info!(band = citizen.band.label(), "eligibility verified, session token issued");

        self.audit.record(AuditEntry {
            action: "eligibility_verified".to_string(),
            actor: AuditActor::System,
            hash_id: identity::derive_hash(&citizen.mykad_number),
            details: format!("screen completed for {} applicant", citizen.band.label()),
            application_id: None,
            metadata: BTreeMap::new(),
            recorded_at: Utc::now(),
        })?;

        Ok(VerificationOutcome {
            session_token: token,
            eligible: screen.eligible,
            requires_review: screen.requires_review,
            full_name: citizen.full_name,
            band: citizen.band,
        })
    }

    /// Step 2 of the citizen flow: redeem the session token, rule on the
    /// submission, and persist the application. The token is cleared after
    /// the record is stored, so it never authorizes a second submission
    /// regardless of the business outcome.
    pub fn submit_application(
        &self,
        session_token: &str,
        program_name: &str,
        account_details: AccountDetails,
    ) -> Result<ApplicationRecord, AidServiceError> {
        let citizen = self
            .store
            .find_by_token(session_token)?
            .ok_or(AidServiceError::InvalidSessionToken)?;

        let ruling = self.engine.rule(citizen.household_income, program_name);
        let now = Utc::now();

        // Advisory only; a failing history lookup degrades to the neutral
        // score instead of failing the submission.
        let assessment = risk::assess(
            self.store.as_ref(),
            &citizen.id,
            program_name,
            ruling.amount(),
            now,
        )
        .unwrap_or_else(|_| RiskAssessment::neutral("Error calculating risk"));

        let mut record = ApplicationRecord {
            id: next_application_id(),
            citizen_id: citizen.id.clone(),
            applicant_name: citizen.full_name.clone(),
            program_name: program_name.to_string(),
            amount: ruling.amount(),
            status: ruling.status(),
            secret_code: None,
            disbursement_method: "Bank Transfer".to_string(),
            account_details,
            risk_score: assessment.score,
            risk_factors: assessment.factors,
            is_auto_approved: false,
            reviewed_by: None,
            reviewed_at: None,
            review_seconds: None,
            region: identity::region_from_ic(&citizen.mykad_number).to_string(),
            created_at: now,
        };

        if matches!(ruling, SubmissionRuling::AutoDisburse { .. }) {
            let code = identity::secret_code(now);
            record.secret_code = Some(code.clone());
            record.is_auto_approved = true;
            self.gateway.transfer(TransferOrder {
                recipient: citizen.full_name.clone(),
                amount: record.amount,
                account: record.account_details.clone(),
                reference: code,
            })?;
        }

        let stored = self.store.insert(record)?;

        // One-time-use: clear the token only after the application is
        // stored, matching the reference ordering (the read-then-clear race
        // at the store boundary is a documented boundary hazard).
        self.store.set_session_token(&citizen.id, None)?;

        info!(
            application = %stored.id.0,
            status = stored.status.label(),
            "application submitted"
        );

        self.audit.record(AuditEntry {
            action: "application_submitted".to_string(),
            actor: AuditActor::System,
            hash_id: identity::derive_hash(&citizen.mykad_number),
            details: format!("{} ruled {}", stored.program_name, stored.status.label()),
            application_id: Some(stored.id.clone()),
            metadata: BTreeMap::from([(
                "risk_score".to_string(),
                stored.risk_score.to_string(),
            )]),
            recorded_at: Utc::now(),
        })?;

        Ok(stored)
    }

    /// Manual admin approval: disburse a pending or rejected application.
    /// Rejects the operation if the application is already disbursed.
    pub fn approve(
        &self,
        application_id: &ApplicationId,
        reviewer: &str,
    ) -> Result<ApplicationRecord, AidServiceError> {
        let mut record = self
            .store
            .fetch(application_id)?
            .ok_or(AidServiceError::ApplicationNotFound)?;

        if record.is_disbursed() {
            return Err(AidServiceError::AlreadyDisbursed);
        }

        let now = Utc::now();
        let code = identity::secret_code(now);
        record.status = ApplicationStatus::Disbursed;
        record.secret_code = Some(code.clone());
        record.reviewed_by = Some(reviewer.to_string());
        record.reviewed_at = Some(now);
        record.review_seconds = Some((now - record.created_at).num_seconds());

        // Transfer first, persist second: a gateway failure must leave the
        // stored record untouched, matching the submission path.
        self.gateway.transfer(TransferOrder {
            recipient: record.applicant_name.clone(),
            amount: record.amount,
            account: record.account_details.clone(),
            reference: code,
        })?;
        self.store.update(record.clone())?;

        self.audit.record(AuditEntry {
            action: "application_approved".to_string(),
            actor: AuditActor::Admin,
            hash_id: self.citizen_hash(&record)?,
            details: format!("{} approved by {reviewer}", record.program_name),
            application_id: Some(record.id.clone()),
            metadata: BTreeMap::new(),
            recorded_at: Utc::now(),
        })?;

        Ok(record)
    }

    /// Reject an application. Disbursed applications cannot be rejected.
    pub fn reject(
        &self,
        application_id: &ApplicationId,
        reviewer: &str,
        reason: Option<&str>,
    ) -> Result<ApplicationRecord, AidServiceError> {
        let mut record = self
            .store
            .fetch(application_id)?
            .ok_or(AidServiceError::ApplicationNotFound)?;

        if record.is_disbursed() {
            return Err(AidServiceError::AlreadyDisbursed);
        }

        let now = Utc::now();
        record.status = ApplicationStatus::Rejected;
        record.reviewed_by = Some(reviewer.to_string());
        record.reviewed_at = Some(now);
        record.review_seconds = Some((now - record.created_at).num_seconds());
        self.store.update(record.clone())?;

        let mut metadata = BTreeMap::new();
        if let Some(reason) = reason {
            metadata.insert("reason".to_string(), reason.to_string());
        }
        self.audit.record(AuditEntry {
            action: "application_rejected".to_string(),
            actor: AuditActor::Admin,
            hash_id: self.citizen_hash(&record)?,
            details: format!("{} rejected by {reviewer}", record.program_name),
            application_id: Some(record.id.clone()),
            metadata,
            recorded_at: Utc::now(),
        })?;

        Ok(record)
    }

    /// Approve each id independently; failures are collected per item and
    /// never abort the batch.
    pub fn bulk_approve(&self, ids: &[ApplicationId], reviewer: &str) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for id in ids {
            match self.approve(id, reviewer) {
                Ok(record) => outcome.succeeded.push(record.id),
                Err(err) => outcome.failed.push(BulkFailure {
                    application_id: id.clone(),
                    reason: err.to_string(),
                }),
            }
        }
        outcome
    }

    /// Reject each id independently, with the same isolation contract as
    /// `bulk_approve`.
    pub fn bulk_reject(
        &self,
        ids: &[ApplicationId],
        reviewer: &str,
        reason: Option<&str>,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for id in ids {
            match self.reject(id, reviewer, reason) {
                Ok(record) => outcome.succeeded.push(record.id),
                Err(err) => outcome.failed.push(BulkFailure {
                    application_id: id.clone(),
                    reason: err.to_string(),
                }),
            }
        }
        outcome
    }

    pub fn get(&self, application_id: &ApplicationId) -> Result<ApplicationRecord, AidServiceError> {
        self.store
            .fetch(application_id)?
            .ok_or(AidServiceError::ApplicationNotFound)
    }

    pub fn list(&self) -> Result<Vec<ApplicationRecord>, AidServiceError> {
        Ok(self.store.all()?)
    }

    /// Pure what-if evaluation; mutates nothing.
    pub fn simulate(
        &self,
        income: u32,
        household_size: Option<u32>,
        program_name: &str,
    ) -> SimulationResult {
        self.engine.simulate(income, household_size, program_name)
    }

    /// Preliminary screen without touching any stored record.
    pub fn screen(&self, income: u32) -> EligibilityScreen {
        self.engine.screen(income)
    }

    /// Direct risk-scorer access for triage tooling. Store failures
    /// propagate here; only the submission path degrades to neutral.
    pub fn risk_profile(
        &self,
        citizen_id: &super::domain::CitizenId,
        program_name: &str,
        amount: u32,
    ) -> Result<RiskAssessment, AidServiceError> {
        Ok(risk::assess(
            self.store.as_ref(),
            citizen_id,
            program_name,
            amount,
            Utc::now(),
        )?)
    }

    pub fn dashboard_summary(&self) -> Result<DashboardSummary, AidServiceError> {
        let records = self.store.all()?;
        let mut summary = DashboardSummary {
            total_applications: records.len(),
            ..DashboardSummary::default()
        };
        let mut tallies: BTreeMap<String, usize> = BTreeMap::new();

        for record in &records {
            match record.status {
                ApplicationStatus::Pending => summary.pending += 1,
                ApplicationStatus::Approved => summary.approved += 1,
                ApplicationStatus::Rejected => summary.rejected += 1,
                ApplicationStatus::Disbursed => {
                    summary.disbursed += 1;
                    summary.funds_disbursed += u64::from(record.amount);
                }
            }
            *tallies.entry(record.program_name.clone()).or_default() += 1;
        }

        summary.by_program = tallies
            .into_iter()
            .map(|(program_name, count)| ProgramTally {
                program_name,
                count,
            })
            .collect();
        summary.by_program.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(summary)
    }

    pub fn activity_feed(&self, limit: usize) -> Result<Vec<AuditEntry>, AidServiceError> {
        Ok(self.audit.recent(limit)?)
    }

    fn citizen_hash(&self, record: &ApplicationRecord) -> Result<String, AidServiceError> {
        let citizen: Option<CitizenRecord> = self.store.find_by_id(&record.citizen_id)?;
        Ok(citizen
            .map(|citizen| identity::derive_hash(&citizen.mykad_number))
            .unwrap_or_else(|| identity::derive_hash(&record.citizen_id.0)))
    }
}

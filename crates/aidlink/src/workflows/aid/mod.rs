//! Privacy-preserving aid disbursement workflow.
//!
//! The citizen flow is two steps: identity verification mints a one-time
//! session token and returns only a coarse eligibility signal; redeeming
//! the token with a chosen program produces the final ruling, an advisory
//! risk score, and (on auto-approval) a simulated disbursement. Storage,
//! audit, and the bank gateway are trait seams owned by the caller.

pub mod audit;
pub mod domain;
pub mod eligibility;
pub mod identity;
pub mod repository;
pub mod risk;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use audit::{AuditActor, AuditEntry, AuditError, AuditSink};
pub use domain::{
    AccountDetails, ApplicationId, ApplicationRecord, ApplicationStatus, CitizenId, CitizenRecord,
    IncomeBand, LinkedAccount,
};
pub use eligibility::{
    check_program, grant_amount, program_rule, DecisionEngine, EligibilityScreen, ProgramRule,
    RuleVerdict, ScreeningPolicy, SimulationResult, SubmissionRuling,
};
pub use repository::{
    ApplicationStore, CitizenDirectory, DisbursementGateway, StoreError, TransferError,
    TransferOrder,
};
pub use risk::{ApplicantHistory, RiskAssessment, NEUTRAL_SCORE};
pub use router::aid_router;
pub use service::{
    AidService, AidServiceError, BulkFailure, BulkOutcome, DashboardSummary, ProgramTally,
    VerificationOutcome,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for citizen records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CitizenId(pub String);

/// Identifier wrapper for submitted aid applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

const B40_CEILING: u32 = 4850;
const M40_CEILING: u32 = 10970;

/// Household income tiers used by the formal program rule table.
///
/// B40 is the lowest band, T20 the highest. Boundaries are inclusive on the
/// lower side: an income exactly at a ceiling stays in the lower band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IncomeBand {
    B40,
    M40,
    T20,
}

impl IncomeBand {
    /// Classify a monthly household income into its band. Total over the
    /// input domain; no failure modes.
    pub const fn classify(income: u32) -> Self {
        if income <= B40_CEILING {
            IncomeBand::B40
        } else if income <= M40_CEILING {
            IncomeBand::M40
        } else {
            IncomeBand::T20
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            IncomeBand::B40 => "B40",
            IncomeBand::M40 => "M40",
            IncomeBand::T20 => "T20",
        }
    }
}

/// Disbursement account linkage captured on the citizen record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
    pub has_account: bool,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_number: String,
}

/// Identity record managed by the out-of-scope onboarding process.
///
/// `session_token` holds the one-time token minted at verification time and
/// cleared exactly once when it is redeemed for a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenRecord {
    pub id: CitizenId,
    pub mykad_number: String,
    pub full_name: String,
    pub household_income: u32,
    pub band: IncomeBand,
    pub session_token: Option<String>,
    pub linked_account: LinkedAccount,
    pub created_at: DateTime<Utc>,
}

/// Free-form account details supplied at submission time for the simulated
/// transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
}

/// Lifecycle status of an aid application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Disbursed,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Disbursed => "disbursed",
        }
    }
}

/// Persisted application aggregate.
///
/// Invariant: `secret_code` is `Some` if and only if `status` is
/// `Disbursed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub citizen_id: CitizenId,
    pub applicant_name: String,
    pub program_name: String,
    pub amount: u32,
    pub status: ApplicationStatus,
    pub secret_code: Option<String>,
    pub disbursement_method: String,
    pub account_details: AccountDetails,
    pub risk_score: u8,
    pub risk_factors: Vec<String>,
    pub is_auto_approved: bool,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Seconds between submission and the manual review decision.
    pub review_seconds: Option<i64>,
    pub region: String,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn is_disbursed(&self) -> bool {
        self.status == ApplicationStatus::Disbursed
    }
}

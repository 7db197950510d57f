mod table;

pub use table::{check_program, program_rule, ProgramRule, RuleVerdict};

use super::domain::{ApplicationStatus, IncomeBand};
use serde::{Deserialize, Serialize};

/// Breakpoints for the quick eligibility screen applied before a program is
/// chosen.
///
/// These deliberately differ from the rule-table bands (4850/10970): the
/// screen is a coarse triage policy, the table is the formal program rule.
/// Keep the two sets separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningPolicy {
    pub auto_approve_ceiling: u32,
    pub review_ceiling: u32,
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self {
            auto_approve_ceiling: 2500,
            review_ceiling: 5000,
        }
    }
}

/// Result of the preliminary screen.
///
/// Carries only the two flags; the caller learns yes/no/maybe, never the
/// underlying income figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityScreen {
    pub eligible: bool,
    pub requires_review: bool,
}

/// Outcome of the submission ruling, before any side effects run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionRuling {
    /// Income at or under the auto-approve ceiling: disburse immediately.
    AutoDisburse { amount: u32 },
    /// Borderline income: hold for manual review.
    PendingReview { amount: u32 },
    /// Income above the review ceiling: reject, amount still computed.
    Rejected { amount: u32 },
}

impl SubmissionRuling {
    pub fn amount(&self) -> u32 {
        match self {
            SubmissionRuling::AutoDisburse { amount }
            | SubmissionRuling::PendingReview { amount }
            | SubmissionRuling::Rejected { amount } => *amount,
        }
    }

    pub fn status(&self) -> ApplicationStatus {
        match self {
            SubmissionRuling::AutoDisburse { .. } => ApplicationStatus::Disbursed,
            SubmissionRuling::PendingReview { .. } => ApplicationStatus::Pending,
            SubmissionRuling::Rejected { .. } => ApplicationStatus::Rejected,
        }
    }
}

/// What-if result returned by the simulation endpoint. Mutates nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub band: IncomeBand,
    pub eligible: bool,
    pub reason: String,
}

/// Benefit amount derived from the program name by keyword match.
///
/// First-match priority: "str"/"rahmah" beats "sara" beats the default flat
/// amount. Matching is a case-insensitive substring check, preserved as-is
/// even though it is over-broad.
pub fn grant_amount(program_name: &str) -> u32 {
    let lowered = program_name.to_lowercase();
    if lowered.contains("str") || lowered.contains("rahmah") {
        100
    } else if lowered.contains("sara") {
        350
    } else {
        500
    }
}

/// Stateless decision engine combining the screen, the keyword amounts, and
/// the formal rule table.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    policy: ScreeningPolicy,
}

impl DecisionEngine {
    pub fn new(policy: ScreeningPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ScreeningPolicy {
        self.policy
    }

    /// Preliminary check run at identity-verification time, before a
    /// program is chosen.
    pub fn screen(&self, income: u32) -> EligibilityScreen {
        if income > self.policy.review_ceiling {
            EligibilityScreen {
                eligible: false,
                requires_review: false,
            }
        } else if income > self.policy.auto_approve_ceiling {
            EligibilityScreen {
                eligible: true,
                requires_review: true,
            }
        } else {
            EligibilityScreen {
                eligible: true,
                requires_review: false,
            }
        }
    }

    /// Ruling applied when a token is redeemed with a chosen program.
    pub fn rule(&self, income: u32, program_name: &str) -> SubmissionRuling {
        let amount = grant_amount(program_name);
        if income > self.policy.review_ceiling {
            SubmissionRuling::Rejected { amount }
        } else if income > self.policy.auto_approve_ceiling {
            SubmissionRuling::PendingReview { amount }
        } else {
            SubmissionRuling::AutoDisburse { amount }
        }
    }

    /// What-if evaluation against the formal rule table. Classifies with
    /// the 4850/10970 band breakpoints, not the screening breakpoints.
    /// `household_size` is accepted for interface parity but unused.
    pub fn simulate(
        &self,
        income: u32,
        _household_size: Option<u32>,
        program_name: &str,
    ) -> SimulationResult {
        let band = IncomeBand::classify(income);
        let verdict = check_program(program_name, band, income);
        SimulationResult {
            band,
            eligible: verdict.eligible,
            reason: verdict.reason,
        }
    }
}

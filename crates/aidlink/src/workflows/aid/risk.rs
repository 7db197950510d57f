use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CitizenId, CitizenRecord, IncomeBand};
use super::repository::StoreError;

/// Read access to an applicant's history, supplied by the storage layer.
pub trait ApplicantHistory: Send + Sync {
    fn citizen(&self, id: &CitizenId) -> Result<Option<CitizenRecord>, StoreError>;
    /// Applications submitted by this citizen at or after `since`.
    fn submissions_since(
        &self,
        id: &CitizenId,
        since: DateTime<Utc>,
    ) -> Result<usize, StoreError>;
    fn rejection_count(&self, id: &CitizenId) -> Result<usize, StoreError>;
    /// Other citizens declaring the same income and band.
    fn matching_households(
        &self,
        income: u32,
        band: IncomeBand,
        excluding: &CitizenId,
    ) -> Result<usize, StoreError>;
}

/// Advisory suspicion estimate for an application: a 0-100 score plus the
/// ordered factor strings that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub factors: Vec<String>,
}

pub const NEUTRAL_SCORE: u8 = 50;

impl RiskAssessment {
    /// Fallback used when scoring cannot run; risk is advisory, not
    /// authorizing, so a neutral score stands in rather than failing the
    /// request.
    pub fn neutral(factor: &str) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            factors: vec![factor.to_string()],
        }
    }
}

const RECENT_WINDOW_DAYS: i64 = 14;
const LOW_RISK_CEILING: u32 = 20;

/// Per-category requested-amount ceilings. A deliberately smaller table
/// than the formal eligibility rules; exceeding it is a risk signal, not a
/// denial.
fn category_ceiling(program_name: &str, band: IncomeBand) -> Option<u32> {
    let ceilings = match program_name {
        "Cash Subsidy (STR)" => [1000, 500, 0],
        "Scholarship" => [5000, 3000, 1000],
        "Health Aid" => [3000, 2000, 1000],
        "Utility Subsidy" => [500, 300, 0],
        _ => return None,
    };

    let ceiling = match band {
        IncomeBand::B40 => ceilings[0],
        IncomeBand::M40 => ceilings[1],
        IncomeBand::T20 => ceilings[2],
    };
    Some(ceiling)
}

/// Programs reserved for the lowest band; a T20 applicant targeting one of
/// these is a strong mismatch signal.
const B40_ONLY_PROGRAMS: [&str; 2] = ["Cash Subsidy (STR)", "Utility Subsidy"];

/// Score an application's suspicion level from historical signals.
///
/// Checks accumulate additively and are clamped to 100 only at the end, so
/// the per-rejection penalty is unbounded before the final clamp. A missing
/// applicant degrades to the neutral score instead of failing; store errors
/// propagate for the caller to decide.
pub fn assess<H>(
    history: &H,
    citizen_id: &CitizenId,
    program_name: &str,
    amount: u32,
    now: DateTime<Utc>,
) -> Result<RiskAssessment, StoreError>
where
    H: ApplicantHistory + ?Sized,
{
    let mut factors = Vec::new();
    let mut score: u32 = 0;

    let citizen = match history.citizen(citizen_id)? {
        Some(citizen) => citizen,
        None => return Ok(RiskAssessment::neutral("Citizen not found")),
    };

    let window_start = now - Duration::days(RECENT_WINDOW_DAYS);
    let recent = history.submissions_since(citizen_id, window_start)?;
    if recent >= 3 {
        score += 25;
        factors.push(format!("Applied {recent}x in 2 weeks"));
    } else if recent == 2 {
        score += 10;
        factors.push("Multiple recent applications".to_string());
    }

    if let Some(ceiling) = category_ceiling(program_name, citizen.band) {
        if amount > ceiling {
            score += 20;
            factors.push("Amount exceeds category limit".to_string());
        }
    }

    if citizen.band == IncomeBand::T20 && B40_ONLY_PROGRAMS.contains(&program_name) {
        score += 30;
        factors.push("T20 applying for B40-only aid".to_string());
    }

    if !citizen.linked_account.has_account {
        score += 15;
        factors.push("No linked bank account".to_string());
    }

    let duplicates =
        history.matching_households(citizen.household_income, citizen.band, citizen_id)?;
    if duplicates >= 3 {
        score += 15;
        factors.push("Potential duplicate household".to_string());
    }

    let rejections = history.rejection_count(citizen_id)?;
    if rejections > 0 {
        score += (rejections as u32) * 10;
        factors.push(format!("{rejections} previous rejection(s)"));
    }

    let score = score.min(100);

    // Cosmetic reassurance for clean histories; carries no score delta.
    if score <= LOW_RISK_CEILING {
        if recent == 0 {
            factors.push("First-time applicant".to_string());
        }
        if citizen.linked_account.has_account {
            factors.push("Verified bank account".to_string());
        }
        factors.push("Income verified".to_string());
    }

    Ok(RiskAssessment {
        score: score as u8,
        factors,
    })
}

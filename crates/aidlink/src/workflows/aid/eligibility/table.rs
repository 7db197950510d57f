use super::super::domain::IncomeBand;
use serde::{Deserialize, Serialize};

/// One cell of the program rule table.
///
/// `max_income: None` models the unbounded T20 ceiling; `amount == 0` marks
/// a band that is categorically excluded from the program regardless of
/// income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRule {
    pub max_income: Option<u32>,
    pub amount: u32,
}

const fn rule(max_income: Option<u32>, amount: u32) -> ProgramRule {
    ProgramRule { max_income, amount }
}

/// Formal rule table keyed by (program name, income band).
///
/// Returns `None` for unknown programs, which callers must keep distinct
/// from "known program, ineligible band".
pub fn program_rule(program: &str, band: IncomeBand) -> Option<ProgramRule> {
    let cells = match program {
        "Cash Subsidy (STR)" => [
            rule(Some(4850), 500),
            rule(Some(10970), 300),
            rule(None, 0),
        ],
        "Scholarship" => [
            rule(Some(4850), 3000),
            rule(Some(10970), 2000),
            rule(None, 1000),
        ],
        "Health Aid" => [
            rule(Some(4850), 2000),
            rule(Some(10970), 1500),
            rule(None, 500),
        ],
        "Utility Subsidy" => [
            rule(Some(4850), 200),
            rule(Some(10970), 100),
            rule(None, 0),
        ],
        _ => return None,
    };

    let cell = match band {
        IncomeBand::B40 => cells[0],
        IncomeBand::M40 => cells[1],
        IncomeBand::T20 => cells[2],
    };
    Some(cell)
}

/// Verdict from checking an income against the rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleVerdict {
    pub eligible: bool,
    pub reason: String,
}

/// Check a (band, income) pair against a program's rule table entry.
pub fn check_program(program: &str, band: IncomeBand, income: u32) -> RuleVerdict {
    let rule = match program_rule(program, band) {
        Some(rule) => rule,
        None => {
            return RuleVerdict {
                eligible: false,
                reason: "Program not found".to_string(),
            }
        }
    };

    if rule.amount == 0 {
        return RuleVerdict {
            eligible: false,
            reason: format!("{} not eligible for this program", band.label()),
        };
    }

    if let Some(ceiling) = rule.max_income {
        if income > ceiling {
            return RuleVerdict {
                eligible: false,
                reason: "Income exceeds limit".to_string(),
            };
        }
    }

    RuleVerdict {
        eligible: true,
        reason: "Meets eligibility criteria".to_string(),
    }
}

use crate::infra::{seed_personas, InMemoryAidStore, InMemoryAuditLog, LoggingBankGateway};
use aidlink::error::AppError;
use aidlink::workflows::aid::{AccountDetails, AidService, AidServiceError, ScreeningPolicy};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Apply every persona to this program instead of the per-persona default
    #[arg(long)]
    pub(crate) program: Option<String>,
    /// Print the audit activity feed at the end of the run
    #[arg(long)]
    pub(crate) show_audit: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryAidStore::default());
    seed_personas(&store);
    let service = AidService::new(
        store,
        Arc::new(InMemoryAuditLog::default()),
        Arc::new(LoggingBankGateway),
        ScreeningPolicy::default(),
    );

    let personas: [(&str, &str); 3] = [
        ("900101145000", "STR"),
        ("950505106000", "Sara Hidup"),
        ("881212147000", "Cash Subsidy (STR)"),
    ];

    println!("Aid disbursement demo (incomes redacted)");
    for (mykad, default_program) in personas {
        let program = args.program.as_deref().unwrap_or(default_program);

        let verification = match service.verify_eligibility(mykad) {
            Ok(outcome) => outcome,
            Err(err) => {
                println!("- Verification failed: {err}");
                continue;
            }
        };
        println!(
            "\n{} ({} band)",
            verification.full_name,
            verification.band.label()
        );
        println!(
            "  Screen: eligible={} requires_review={}",
            verification.eligible, verification.requires_review
        );

        let record = match service.submit_application(
            &verification.session_token,
            program,
            AccountDetails::default(),
        ) {
            Ok(record) => record,
            Err(err @ AidServiceError::InvalidSessionToken) => {
                println!("  Submission refused: {err}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        println!(
            "  Application {} for {} -> {} (RM{})",
            record.id.0, record.program_name, record.status.label(), record.amount
        );
        if let Some(code) = &record.secret_code {
            println!("  Collection code: {code}");
        }
        println!(
            "  Risk score {} ({})",
            record.risk_score,
            record.risk_factors.join("; ")
        );
    }

    let summary = service.dashboard_summary()?;
    println!(
        "\nSummary: {} applications | {} disbursed | {} pending | {} rejected | RM{} released",
        summary.total_applications,
        summary.disbursed,
        summary.pending,
        summary.rejected,
        summary.funds_disbursed
    );

    if args.show_audit {
        println!("\nAudit trail (hashed identities)");
        for entry in service.activity_feed(50)? {
            println!(
                "- [{}] {} {}: {}",
                entry.recorded_at.format("%H:%M:%S"),
                entry.hash_id,
                entry.action,
                entry.details
            );
        }
    }

    Ok(())
}

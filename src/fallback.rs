//! Deterministic synthetic records for offline and degraded runs.
//!
//! When the extraction service is unavailable, misconfigured, or returns
//! unusable output, the pipeline substitutes a fixed synthetic record so the
//! downstream analysis always receives a structurally valid bundle. The
//! financial constants are Apple's fiscal 2023 figures, which keeps demo
//! ratio output in a realistic range. Records produced here are always
//! tagged `RecordSource::Fallback` by the caller.

use crate::locator::DocumentType;
use crate::record::{BoardMember, EventFacts, ExtractionRecord, FinancialFacts, GovernanceFacts};

/// Returns the synthetic record for a document type. Pure and total: the
/// same input always yields the same record.
pub fn synthetic_record(document_type: DocumentType) -> ExtractionRecord {
    match document_type {
        DocumentType::AnnualReport => ExtractionRecord::Financial(FinancialFacts {
            revenue_current: 383_285_000_000,
            revenue_prior_1: 394_328_000_000,
            net_income_current: 96_995_000_000,
            total_assets: 352_755_000_000,
            total_debt: 111_088_000_000,
            cash_equivalents: 29_965_000_000,
            shareholders_equity: 62_146_000_000,
            operating_income: 0,
        }),
        DocumentType::ProxyStatement => ExtractionRecord::Governance(GovernanceFacts {
            ceo_total_comp_current: 63_209_230,
            board_members: vec![
                BoardMember {
                    name: "Tim Cook".to_string(),
                    role: "CEO & Director".to_string(),
                    tenure_years: 12,
                    independent: false,
                },
                BoardMember {
                    name: "Arthur Levinson".to_string(),
                    role: "Chairman".to_string(),
                    tenure_years: 21,
                    independent: true,
                },
            ],
            say_on_pay_approval_pct: 95.4,
        }),
        DocumentType::EventReport => ExtractionRecord::Event(EventFacts {
            event_type: "Results of Operations and Financial Condition".to_string(),
            event_date: "2024-11-01".to_string(),
            description: "Quarterly earnings announcement".to_string(),
            financial_impact: 0,
        }),
    }
}

//! Normalized extraction records.
//!
//! Each downloaded filing is normalized into one of three fixed shapes:
//! financial facts from annual reports, governance facts from proxy
//! statements, and event facts from event filings. Every field carries a
//! serde default, so a record is always well-formed for its declared shape:
//! a metric the extraction service didn't return comes back as zero or
//! empty, never as a missing key. Downstream ratio computation relies on
//! this.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::locator::DocumentType;

/// Lenient numeric parse: the extraction service is loose about types, so
/// integers, floats, and numeric strings (with thousands separators) all
/// count; anything else collapses to zero rather than failing the record.
fn lenient_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.replace(',', "").trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn de_dollars<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = lenient_f64(&value);
    Ok(if parsed.is_finite() && parsed > 0.0 {
        parsed as u64
    } else {
        0
    })
}

fn de_signed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = lenient_f64(&value);
    Ok(if parsed.is_finite() { parsed as i64 } else { 0 })
}

fn de_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = lenient_f64(&value);
    Ok(if parsed.is_finite() && parsed > 0.0 {
        parsed as u32
    } else {
        0
    })
}

fn de_pct<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_f64(&value).clamp(0.0, 100.0))
}

/// Where an extraction record came from.
///
/// A company with genuinely zero cash would otherwise be indistinguishable
/// from a failed extraction that returned zero-filled data, so every record
/// is tagged with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordSource {
    /// Parsed from a live extraction service response.
    Live,
    /// Substituted synthetic data; the service was unavailable,
    /// misconfigured, or returned unusable output.
    Fallback,
}

/// An extraction record together with its provenance tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub record: ExtractionRecord,
    pub source: RecordSource,
}

impl Extraction {
    pub fn live(record: ExtractionRecord) -> Self {
        Self {
            record,
            source: RecordSource::Live,
        }
    }

    pub fn fallback(record: ExtractionRecord) -> Self {
        Self {
            record,
            source: RecordSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RecordSource::Fallback
    }
}

/// A normalized record extracted from a filing, one variant per shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionRecord {
    Financial(FinancialFacts),
    Governance(GovernanceFacts),
    Event(EventFacts),
}

impl ExtractionRecord {
    pub fn as_financial(&self) -> Option<&FinancialFacts> {
        match self {
            ExtractionRecord::Financial(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_governance(&self) -> Option<&GovernanceFacts> {
        match self {
            ExtractionRecord::Governance(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&EventFacts> {
        match self {
            ExtractionRecord::Event(e) => Some(e),
            _ => None,
        }
    }

    /// The document type this record's shape corresponds to.
    pub fn document_type(&self) -> DocumentType {
        match self {
            ExtractionRecord::Financial(_) => DocumentType::AnnualReport,
            ExtractionRecord::Governance(_) => DocumentType::ProxyStatement,
            ExtractionRecord::Event(_) => DocumentType::EventReport,
        }
    }
}

/// Financial metrics from an annual report, in whole base currency units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialFacts {
    #[serde(default, deserialize_with = "de_dollars")]
    pub revenue_current: u64,
    #[serde(default, deserialize_with = "de_dollars")]
    pub revenue_prior_1: u64,
    #[serde(default, deserialize_with = "de_dollars")]
    pub net_income_current: u64,
    #[serde(default, deserialize_with = "de_dollars")]
    pub total_assets: u64,
    #[serde(default, deserialize_with = "de_dollars")]
    pub cash_equivalents: u64,
    #[serde(default, deserialize_with = "de_dollars")]
    pub total_debt: u64,
    #[serde(default, deserialize_with = "de_dollars")]
    pub shareholders_equity: u64,
    #[serde(default, deserialize_with = "de_dollars")]
    pub operating_income: u64,
}

impl FinancialFacts {
    /// Acceptance gate for live extraction output: at least one headline
    /// metric must be present and positive, otherwise the response is
    /// treated as an extraction failure.
    pub fn is_plausible(&self) -> bool {
        self.revenue_current > 0 || self.net_income_current > 0 || self.total_assets > 0
    }
}

/// Governance facts from a proxy statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceFacts {
    #[serde(default, deserialize_with = "de_dollars")]
    pub ceo_total_comp_current: u64,
    #[serde(default)]
    pub board_members: Vec<BoardMember>,
    #[serde(default, deserialize_with = "de_pct")]
    pub say_on_pay_approval_pct: f64,
}

/// A single board seat, as disclosed in the proxy statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, deserialize_with = "de_years")]
    pub tenure_years: u32,
    #[serde(default)]
    pub independent: bool,
}

/// Facts from an event filing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFacts {
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub event_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de_signed")]
    pub financial_impact: i64,
}

//! Client for the external document-understanding service.
//!
//! A cached filing (or a sanitized excerpt of it) is submitted together with
//! an extraction instruction, and the service's loosely-shaped response is
//! normalized into a typed record. This is a best-effort integration by
//! contract: a missing credential, a network failure, a bad status, or
//! output that fails validation all degrade to the synthetic fallback
//! record, and `extract` never surfaces an error to the caller.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};
use std::fs;
use std::time::Duration;

use crate::downloader::CachedDocument;
use crate::error::{FilingError, Result};
use crate::fallback::synthetic_record;
use crate::locator::DocumentType;
use crate::record::{EventFacts, Extraction, ExtractionRecord, FinancialFacts, GovernanceFacts};
use crate::sanitize::sanitize;

/// Production endpoint of the extraction service.
const DEFAULT_ENDPOINT: &str = "https://api.va.landing.ai/v1/ade/parse";

/// Extraction calls can chew on a large document for a while.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(120);

/// Credential values that mean "no real key configured".
const PLACEHOLDER_KEYS: [&str; 3] = ["your_landing_ai_key_here", "demo_key", "test_key"];

/// Instruction sent for annual reports.
pub const FINANCIAL_INSTRUCTION: &str = "Extract key financial metrics from this SEC 10-K filing. \
     Return JSON with: revenue_current, revenue_prior_1, net_income_current, \
     total_assets, cash_equivalents, total_debt, shareholders_equity. \
     Convert all values to dollars.";

/// Instruction sent for proxy statements.
pub const GOVERNANCE_INSTRUCTION: &str = "Extract governance data from this proxy statement. \
     Return JSON with: ceo_total_comp_current, board_members (array), say_on_pay_approval_pct.";

/// Instruction sent for event filings.
pub const EVENT_INSTRUCTION: &str = "Extract the reported event from this SEC 8-K filing. \
     Return JSON with: event_type, event_date, description, financial_impact.";

/// The built-in instruction for a document type.
pub fn instruction_for(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::AnnualReport => FINANCIAL_INSTRUCTION,
        DocumentType::ProxyStatement => GOVERNANCE_INSTRUCTION,
        DocumentType::EventReport => EVENT_INSTRUCTION,
    }
}

static REVENUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"revenue[s]?\s*[:\s]\s*\$?\s*([0-9,]+(?:\.[0-9]+)?)\s*(billion|million|b|m)?")
        .unwrap()
});
static NET_INCOME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"net\s+income\s*[:\s]\s*\$?\s*([0-9,]+(?:\.[0-9]+)?)\s*(billion|million|b|m)?")
        .unwrap()
});

/// Client for the extraction service.
///
/// Construct with an explicit key, or with [`ExtractionClient::from_env`] to
/// pick up the key from the environment. A `None` or placeholder key puts
/// the client in offline mode where every call returns the synthetic record
/// without touching the network.
#[derive(Debug, Clone)]
pub struct ExtractionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ExtractionClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(EXTRACTION_TIMEOUT)
            .build()
            .map_err(|e| FilingError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
        })
    }

    /// Reads the service key from `VISION_AGENT_API_KEY` or
    /// `LANDING_AI_API_KEY`, in that order.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("VISION_AGENT_API_KEY")
            .or_else(|_| std::env::var("LANDING_AI_API_KEY"))
            .ok();
        if api_key.is_none() {
            tracing::warn!("No extraction service key configured; running with synthetic records");
        }
        Self::new(api_key)
    }

    /// Overrides the service endpoint. Intended for tests.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Whether a real (non-placeholder) credential is configured.
    pub fn has_usable_credential(&self) -> bool {
        match self.api_key.as_deref() {
            Some(key) => !key.is_empty() && !PLACEHOLDER_KEYS.contains(&key),
            None => false,
        }
    }

    /// Extracts a normalized record from a cached filing.
    ///
    /// Never fails: any degraded path substitutes the synthetic record for
    /// the document's type, tagged `RecordSource::Fallback` so the caller
    /// can tell fabricated data from a genuine zero.
    pub async fn extract(&self, document: &CachedDocument, instruction: &str) -> Extraction {
        let document_type = document.filing_ref.document_type;

        if !self.has_usable_credential() {
            tracing::info!(
                "Extraction credential absent or placeholder; using synthetic {} record",
                document_type
            );
            return Extraction::fallback(synthetic_record(document_type));
        }

        match self.call_service(document, instruction).await {
            Ok(response) => match normalize_response(response, document_type) {
                Some(record) => Extraction::live(record),
                None => {
                    tracing::warn!(
                        "Extraction response failed validation for {}; using synthetic record",
                        document.filing_ref.accession_key
                    );
                    Extraction::fallback(synthetic_record(document_type))
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Extraction call failed for {} ({}); using synthetic record",
                    document.filing_ref.accession_key,
                    e
                );
                Extraction::fallback(synthetic_record(document_type))
            }
        }
    }

    /// Single HTTP call to the service: multipart upload when the cached
    /// file is on disk, inline JSON with a sanitized excerpt otherwise.
    async fn call_service(&self, document: &CachedDocument, instruction: &str) -> Result<Value> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FilingError::ConfigError("No extraction key".to_string()))?;

        let request = if document.local_path.exists() {
            let bytes = fs::read(&document.local_path)?;
            let file_name = document
                .local_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(document.mime_kind.mime_type())
                .map_err(|e| FilingError::InvalidResponse(e.to_string()))?;
            let form = reqwest::multipart::Form::new()
                .part("document", part)
                .text("prompt", instruction.to_string());
            self.client
                .post(&self.endpoint)
                .bearer_auth(key)
                .multipart(form)
        } else {
            let raw = fs::read(&document.local_path)
                .map(|b| String::from_utf8_lossy(&b).into_owned())
                .unwrap_or_default();
            let excerpt = sanitize(&raw, document.mime_kind);
            self.client
                .post(&self.endpoint)
                .bearer_auth(key)
                .json(&json!({ "document": excerpt, "prompt": instruction }))
        };

        let response = request.send().await.map_err(FilingError::RequestError)?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let preview = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect::<String>();
            return Err(FilingError::InvalidResponse(format!(
                "Extraction service returned {}: {}",
                status, preview
            )));
        }

        response.json().await.map_err(FilingError::RequestError)
    }
}

/// Unwraps the service's variably-shaped response into the payload object.
///
/// Tries the named payload fields in order, then falls back to scraping a
/// markdown rendition, then takes the raw response as-is.
fn unwrap_payload(response: Value) -> Value {
    if let Value::Object(ref map) = response {
        for key in ["extracted_data", "data", "result"] {
            if let Some(payload) = map.get(key) {
                return payload.clone();
            }
        }
        if let Some(Value::String(markdown)) = map.get("markdown") {
            let scraped = scrape_markdown(markdown);
            return serde_json::to_value(scraped).unwrap_or(Value::Null);
        }
    }
    response
}

/// Normalizes a service response into the record shape for a document type.
///
/// Financial records additionally pass the plausibility gate: at least one
/// of the headline metrics must be positive, or the response is rejected.
fn normalize_response(response: Value, document_type: DocumentType) -> Option<ExtractionRecord> {
    let payload = unwrap_payload(response);

    match document_type {
        DocumentType::AnnualReport => serde_json::from_value::<FinancialFacts>(payload)
            .ok()
            .filter(FinancialFacts::is_plausible)
            .map(ExtractionRecord::Financial),
        DocumentType::ProxyStatement => serde_json::from_value::<GovernanceFacts>(payload)
            .ok()
            .map(ExtractionRecord::Governance),
        DocumentType::EventReport => serde_json::from_value::<EventFacts>(payload)
            .ok()
            .map(ExtractionRecord::Event),
    }
}

/// Regex scrape of revenue and net income mentions out of markdown prose.
fn scrape_markdown(markdown: &str) -> FinancialFacts {
    let text = markdown.to_lowercase();
    let mut facts = FinancialFacts::default();

    if let Some(caps) = REVENUE_RE.captures(&text) {
        facts.revenue_current = to_dollars(&caps[1], caps.get(2).map(|m| m.as_str()));
    }
    if let Some(caps) = NET_INCOME_RE.captures(&text) {
        facts.net_income_current = to_dollars(&caps[1], caps.get(2).map(|m| m.as_str()));
    }

    facts
}

/// Converts a scraped "97.0" + "billion" style mention to whole dollars.
fn to_dollars(value: &str, unit: Option<&str>) -> u64 {
    let Ok(value) = value.replace(',', "").parse::<f64>() else {
        return 0;
    };
    let scaled = match unit.unwrap_or("") {
        "billion" | "b" => value * 1e9,
        "million" | "m" => value * 1e6,
        _ => value,
    };
    if scaled.is_finite() && scaled > 0.0 {
        scaled as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrapes_net_income_in_billions() {
        let facts = scrape_markdown("Net Income: $97.0 billion for fiscal 2023");
        assert_eq!(facts.net_income_current, 97_000_000_000);
    }

    #[test]
    fn scrapes_revenue_with_short_suffix_and_commas() {
        let facts = scrape_markdown("Revenues: $383,285 m across segments");
        assert_eq!(facts.revenue_current, 383_285_000_000);
    }

    #[test]
    fn unitless_values_are_taken_as_dollars() {
        let facts = scrape_markdown("revenue: 5000");
        assert_eq!(facts.revenue_current, 5000);
    }

    #[test]
    fn payload_field_order() {
        let response = json!({ "data": { "revenue_current": 7 }, "result": { "revenue_current": 9 } });
        let payload = unwrap_payload(response);
        assert_eq!(payload["revenue_current"], 7);

        let response = json!({ "extracted_data": { "total_assets": 1 }, "data": { "total_assets": 2 } });
        assert_eq!(unwrap_payload(response)["total_assets"], 1);
    }

    #[test]
    fn markdown_payload_is_scraped() {
        let response = json!({ "markdown": "Net Income: $97.0 billion" });
        let record = normalize_response(response, DocumentType::AnnualReport).unwrap();
        assert_eq!(
            record.as_financial().unwrap().net_income_current,
            97_000_000_000
        );
    }

    #[test]
    fn raw_object_is_used_when_no_named_field_matches() {
        let response = json!({ "revenue_current": 12, "net_income_current": 0 });
        let record = normalize_response(response, DocumentType::AnnualReport).unwrap();
        assert_eq!(record.as_financial().unwrap().revenue_current, 12);
    }

    #[test]
    fn all_zero_financials_fail_validation() {
        let response = json!({ "extracted_data": {
            "revenue_current": 0, "net_income_current": 0, "total_assets": 0
        }});
        assert!(normalize_response(response, DocumentType::AnnualReport).is_none());
    }

    #[test]
    fn single_positive_metric_passes_validation() {
        let response = json!({ "extracted_data": { "total_assets": 352_755_000_000u64 }});
        let record = normalize_response(response, DocumentType::AnnualReport).unwrap();
        assert_eq!(
            record.as_financial().unwrap().total_assets,
            352_755_000_000
        );
    }

    #[test]
    fn governance_payload_normalizes() {
        let response = json!({ "data": {
            "ceo_total_comp_current": 1_000_000,
            "board_members": [
                { "name": "A", "role": "Chair", "tenure_years": 4, "independent": true }
            ],
            "say_on_pay_approval_pct": 88.5
        }});
        let record = normalize_response(response, DocumentType::ProxyStatement).unwrap();
        let facts = record.as_governance().unwrap();
        assert_eq!(facts.board_members.len(), 1);
        assert_eq!(facts.say_on_pay_approval_pct, 88.5);
    }

    #[test]
    fn placeholder_keys_are_not_usable() {
        for key in ["", "demo_key", "test_key", "your_landing_ai_key_here"] {
            let client = ExtractionClient::new(Some(key.to_string())).unwrap();
            assert!(!client.has_usable_credential(), "{:?}", key);
        }
        let client = ExtractionClient::new(Some("real-key".to_string())).unwrap();
        assert!(client.has_usable_credential());
        let client = ExtractionClient::new(None).unwrap();
        assert!(!client.has_usable_credential());
    }
}

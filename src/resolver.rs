//! Ticker resolution against the registry's bulk listing snapshot.
//!
//! Every pipeline run starts here: the registry keys everything by its own
//! stable company identifier (the CIK), not by trading ticker, so the ticker
//! must be resolved before any filing lookup. The bulk snapshot is a
//! multi-megabyte JSON map, fetched once per process and shared across all
//! clones of the client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::Registry;
use super::error::{FilingError, Result};
use super::traits::ResolverOperations;

/// One entry in the registry's ticker listing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompanyTicker {
    #[serde(rename = "cik_str")]
    pub cik: u64,
    pub ticker: String,
    pub title: String,
}

/// The complete ticker listing, as loaded from the bulk endpoint.
pub type TickerSnapshot = Vec<CompanyTicker>;

/// A resolved company identity, immutable for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyIdentity {
    /// The trading ticker, uppercased.
    pub ticker: String,
    /// The registry's stable identifier, zero-padded to ten digits as the
    /// wire format expects.
    pub canonical_id: String,
    /// The company's registered name.
    pub display_name: String,
}

impl CompanyIdentity {
    /// The canonical id with leading zeros stripped, as used in archive
    /// paths.
    pub fn canonical_id_unpadded(&self) -> String {
        let trimmed = self.canonical_id.trim_start_matches('0');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Case-insensitive exact-match lookup within a loaded snapshot.
pub fn resolve_in_snapshot(snapshot: &[CompanyTicker], ticker: &str) -> Option<CompanyIdentity> {
    let wanted = ticker.to_uppercase();
    snapshot
        .iter()
        .find(|entry| entry.ticker.eq_ignore_ascii_case(&wanted))
        .map(|entry| CompanyIdentity {
            ticker: wanted.clone(),
            canonical_id: format!("{:010}", entry.cik),
            display_name: entry.title.clone(),
        })
}

#[async_trait]
impl ResolverOperations for Registry {
    /// Returns the ticker snapshot, fetching it on first use.
    ///
    /// The registry serves the listing as a JSON object keyed by row index;
    /// the keys carry no meaning and are dropped.
    async fn company_tickers(&self) -> Result<Arc<TickerSnapshot>> {
        let snapshot = self
            .snapshot
            .get_or_try_init(|| async {
                let url = format!("{}/company_tickers.json", self.files_url());
                tracing::debug!("Fetching ticker snapshot from {}", url);

                let body = self.get(&url).await?;
                let indexed: HashMap<String, CompanyTicker> = serde_json::from_str(&body)?;
                let listing: TickerSnapshot = indexed.into_values().collect();

                tracing::info!("Loaded ticker snapshot with {} entries", listing.len());
                Ok::<_, FilingError>(Arc::new(listing))
            })
            .await?;

        Ok(Arc::clone(snapshot))
    }

    /// Resolves a ticker to a company identity.
    ///
    /// # Errors
    ///
    /// `FilingError::TickerNotFound` if the ticker is absent from the
    /// snapshot. This is the only fatal error in the pipeline: the caller
    /// must not proceed to filing lookup without an identity.
    async fn resolve(&self, ticker: &str) -> Result<CompanyIdentity> {
        let snapshot = self.company_tickers().await?;
        resolve_in_snapshot(&snapshot, ticker)
            .ok_or_else(|| FilingError::TickerNotFound(ticker.to_uppercase()))
    }
}

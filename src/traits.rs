//! Trait definitions organizing registry operations by pipeline stage.
//!
//! The `Registry` client implements one trait per retrieval stage
//! (resolution, location, download) so each stage's surface is discoverable
//! on its own and easy to stand in for in tests. Users typically call the
//! methods directly on `Registry`; the traits mostly serve as the map of the
//! API.

use async_trait::async_trait;
use std::sync::Arc;

use super::config::RunConfig;
use super::downloader::CachedDocument;
use super::error::Result;
use super::locator::{DocumentType, FilingReference};
use super::resolver::{CompanyIdentity, TickerSnapshot};

/// Ticker resolution against the registry's bulk listing.
///
/// The listing snapshot is multi-megabyte, so implementations fetch it once
/// and reuse it for every resolution within the process.
#[async_trait]
pub trait ResolverOperations {
    /// Returns the complete ticker snapshot, fetching it on first use.
    async fn company_tickers(&self) -> Result<Arc<TickerSnapshot>>;
    /// Resolves a ticker (case-insensitive exact match) to a company
    /// identity, failing with `TickerNotFound` when absent.
    async fn resolve(&self, ticker: &str) -> Result<CompanyIdentity>;
}

/// Filing location within the registry's per-company chronological feed.
#[async_trait]
pub trait LocatorOperations {
    /// Returns candidate filings of one type inside the lookback window,
    /// most recent first. An empty result is an expected outcome, not an
    /// error.
    async fn locate(
        &self,
        canonical_id: &str,
        document_type: DocumentType,
        lookback_years: u32,
    ) -> Result<Vec<FilingReference>>;

    /// Parses a feed body into references without touching the network.
    fn locate_from_string(
        &self,
        content: &str,
        document_type: DocumentType,
        lookback_years: u32,
    ) -> Result<Vec<FilingReference>>;
}

/// Filing retrieval into the on-disk content cache.
#[async_trait]
pub trait DownloaderOperations {
    /// Downloads one filing, retrying once through the viewer URL form.
    /// `Ok(None)` means both attempts failed and the filing is unavailable.
    async fn download(
        &self,
        identity: &CompanyIdentity,
        reference: &FilingReference,
        run: &RunConfig,
    ) -> Result<Option<CachedDocument>>;
}

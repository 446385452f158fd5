//! # FilingKit - SEC filing retrieval and extraction pipeline
//!
//! FilingKit assembles the document side of an activist-investor analysis:
//! it locates a company's filings on the public registry, downloads and
//! caches them, and normalizes their heterogeneous formats (HTML tables,
//! plain text, PDFs) into typed financial and governance records via an
//! external document-understanding service, with deterministic synthetic
//! fallback when that service is unavailable.
//!
//! ## Pipeline stages
//!
//! - **Resolution** - ticker → stable registry identifier and canonical name
//! - **Location** - per-company ATOM feed query, bounded to a lookback window
//! - **Download** - archive retrieval into a local content cache, with one
//!   alternate-URL retry
//! - **Sanitization** - bounded, table-biased excerpts of HTML/text filings
//! - **Extraction** - multipart or inline submission to the extraction
//!   service, normalized into fixed record shapes with provenance tags
//! - **Fallback** - fixed synthetic records for offline and degraded runs
//!
//! Filings are fetched serially for one company at a time; the pipeline is
//! built for human-interactive latency, not throughput.
//!
//! ## Basic Usage
//!
//! ```ignore
//! use filingkit::{ExtractionClient, FilingPipeline, Registry, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The registry requires an identifying user agent.
//!     let registry = Registry::new("my_app/1.0 (me@example.com)")?;
//!     let extractor = ExtractionClient::from_env()?;
//!     let pipeline = FilingPipeline::new(registry, extractor, RunConfig::default());
//!
//!     let bundle = pipeline.collect("AAPL").await?;
//!     println!(
//!         "{}: financial record from {:?}",
//!         bundle.identity.display_name, bundle.financial.source
//!     );
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod downloader;
mod error;
mod extract;
mod fallback;
mod locator;
mod options;
pub mod parsing;
mod pipeline;
mod record;
mod resolver;
mod sanitize;
mod traits;

pub use config::{RegistryConfig, RegistryUrls, RunConfig};
pub use core::Registry;
pub use error::{FilingError, Result};

pub use downloader::{CachedDocument, MimeKind, store_document};
pub use extract::{
    EVENT_INSTRUCTION, ExtractionClient, FINANCIAL_INSTRUCTION, GOVERNANCE_INSTRUCTION,
    instruction_for,
};
pub use fallback::synthetic_record;
pub use locator::{DocumentType, FilingReference, references_from_feed};
pub use options::FeedOptions;
pub use pipeline::{DocumentBundle, FilingPipeline};
pub use record::{
    BoardMember, EventFacts, Extraction, ExtractionRecord, FinancialFacts, GovernanceFacts,
    RecordSource,
};
pub use resolver::{CompanyIdentity, CompanyTicker, TickerSnapshot, resolve_in_snapshot};
pub use sanitize::sanitize;

pub use traits::{DownloaderOperations, LocatorOperations, ResolverOperations};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

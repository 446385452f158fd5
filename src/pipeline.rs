//! End-to-end orchestration of the retrieval and extraction stages.
//!
//! One `collect` call runs the whole flow for a company: resolve the ticker
//! once, then for each filing type locate candidates, download up to the
//! configured cap, and extract a normalized record. Filing types and
//! individual filings are processed sequentially; the only suspension points
//! are network I/O, and pacing against the registry host is enforced by the
//! client's rate limiter.
//!
//! Degradation policy: only an unknown ticker aborts. A feed that can't be
//! fetched or parsed yields no documents for that type, a failed download
//! omits that filing, and a failed extraction substitutes the synthetic
//! record, so the returned bundle is always structurally complete.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::Registry;
use crate::config::RunConfig;
use crate::downloader::CachedDocument;
use crate::error::Result;
use crate::extract::{ExtractionClient, instruction_for};
use crate::fallback::synthetic_record;
use crate::locator::DocumentType;
use crate::record::Extraction;
use crate::resolver::CompanyIdentity;
use crate::traits::{DownloaderOperations, LocatorOperations, ResolverOperations};

/// How many event filings are extracted per run. Events beyond the first
/// two rarely change the analysis and each extraction call is expensive.
const MAX_EVENT_EXTRACTIONS: usize = 2;

/// The structured document bundle handed to the analysis layer.
///
/// `financial` and `governance` are always present (synthetic when the
/// corresponding filing was missing or extraction degraded), so downstream
/// ratio computation never hits an undefined value. `events` carries one
/// record per extracted event filing and may be empty.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentBundle {
    pub identity: CompanyIdentity,
    pub financial: Extraction,
    pub governance: Extraction,
    pub events: Vec<Extraction>,
    /// Every document cached during the run, keyed by filing type.
    pub documents: BTreeMap<DocumentType, Vec<CachedDocument>>,
}

/// Orchestrator tying the registry client and the extraction client
/// together under one per-run configuration.
#[derive(Debug, Clone)]
pub struct FilingPipeline {
    registry: Registry,
    extractor: ExtractionClient,
    run: RunConfig,
}

impl FilingPipeline {
    pub fn new(registry: Registry, extractor: ExtractionClient, run: RunConfig) -> Self {
        Self {
            registry,
            extractor,
            run,
        }
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// Runs the full pipeline for one ticker.
    ///
    /// # Errors
    ///
    /// `FilingError::TickerNotFound` when the ticker is absent from the
    /// registry snapshot. Every other failure mode degrades into the bundle.
    pub async fn collect(&self, ticker: &str) -> Result<DocumentBundle> {
        let identity = self.registry.resolve(ticker).await?;
        tracing::info!(
            "Collecting filings for {} ({})",
            identity.display_name,
            identity.canonical_id
        );

        let mut documents: BTreeMap<DocumentType, Vec<CachedDocument>> = BTreeMap::new();
        for document_type in DocumentType::all() {
            let cached = self.fetch_type(&identity, document_type).await;
            tracing::info!(
                "{}: {} filing(s) cached for {}",
                document_type,
                cached.len(),
                identity.ticker
            );
            documents.insert(document_type, cached);
        }

        let financial = self
            .extract_one(&documents, DocumentType::AnnualReport)
            .await;
        let governance = self
            .extract_one(&documents, DocumentType::ProxyStatement)
            .await;

        let mut events = Vec::new();
        if let Some(event_docs) = documents.get(&DocumentType::EventReport) {
            for doc in event_docs.iter().take(MAX_EVENT_EXTRACTIONS) {
                events.push(self.extract_document(doc).await);
            }
        }

        Ok(DocumentBundle {
            identity,
            financial,
            governance,
            events,
            documents,
        })
    }

    /// Returns the cache path of the most recent filing of a type, if one
    /// can be located and downloaded.
    pub async fn latest_filing(
        &self,
        ticker: &str,
        document_type: DocumentType,
    ) -> Result<Option<PathBuf>> {
        let identity = self.registry.resolve(ticker).await?;
        let references = self
            .registry
            .locate(&identity.canonical_id, document_type, self.run.lookback_years)
            .await?;

        for reference in references.iter().take(self.run.max_filings_per_type) {
            if let Some(doc) = self.registry.download(&identity, reference, &self.run).await? {
                return Ok(Some(doc.local_path));
            }
        }
        Ok(None)
    }

    /// Locates and downloads filings of one type, bounded by the per-type
    /// cap. Locate and download failures degrade to fewer (or no) documents.
    async fn fetch_type(
        &self,
        identity: &CompanyIdentity,
        document_type: DocumentType,
    ) -> Vec<CachedDocument> {
        let references = match self
            .registry
            .locate(&identity.canonical_id, document_type, self.run.lookback_years)
            .await
        {
            Ok(references) => references,
            Err(e) => {
                tracing::warn!("Locating {} filings failed: {}", document_type, e);
                return Vec::new();
            }
        };

        if references.is_empty() {
            tracing::info!(
                "No {} filings for {} in the last {} year(s)",
                document_type,
                identity.ticker,
                self.run.lookback_years
            );
            return Vec::new();
        }

        let mut cached = Vec::new();
        for reference in references.iter().take(self.run.max_filings_per_type) {
            match self.registry.download(identity, reference, &self.run).await {
                Ok(Some(doc)) => cached.push(doc),
                Ok(None) => {} // both URLs failed; filing omitted
                Err(e) => {
                    tracing::warn!(
                        "Caching {} failed: {}; filing omitted",
                        reference.accession_key,
                        e
                    );
                }
            }
        }
        cached
    }

    /// Extracts from the most recent cached document of a type, or takes
    /// the synthetic record when nothing was cached.
    async fn extract_one(
        &self,
        documents: &BTreeMap<DocumentType, Vec<CachedDocument>>,
        document_type: DocumentType,
    ) -> Extraction {
        match documents.get(&document_type).and_then(|docs| docs.first()) {
            Some(doc) => self.extract_document(doc).await,
            None => Extraction::fallback(synthetic_record(document_type)),
        }
    }

    async fn extract_document(&self, document: &CachedDocument) -> Extraction {
        let document_type = document.filing_ref.document_type;
        if self.run.use_synthetic_data {
            return Extraction::fallback(synthetic_record(document_type));
        }
        self.extractor
            .extract(document, instruction_for(document_type))
            .await
    }
}

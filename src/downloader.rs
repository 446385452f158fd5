//! Filing download and the on-disk content cache.
//!
//! Documents land under `{cache_root}/{TICKER}/` with one file per filing,
//! named by ticker, document type, and filing date, with the extension
//! sniffed from the response body. The body is written verbatim so the cache
//! holds exactly what the registry served.
//!
//! A failed download is not fatal: the primary URL (feed-supplied or derived
//! from the archive path convention) gets exactly one retry through the
//! registry's document viewer form, and if that also fails the filing is
//! reported absent so the caller can continue with the remaining filings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::Registry;
use super::config::RunConfig;
use super::error::Result;
use super::locator::FilingReference;
use super::resolver::CompanyIdentity;
use super::traits::DownloaderOperations;

/// Coarse content kind of a cached document, sniffed from its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MimeKind {
    Html,
    Pdf,
    Plain,
}

impl MimeKind {
    /// Sniffs the kind from the leading bytes of a document body.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"%PDF-") {
            return MimeKind::Pdf;
        }
        let head = bytes.iter().position(|b| !b.is_ascii_whitespace());
        match head.map(|i| bytes[i]) {
            Some(b'<') => MimeKind::Html,
            _ => MimeKind::Plain,
        }
    }

    /// Cache file extension for this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            MimeKind::Html => "html",
            MimeKind::Pdf => "pdf",
            MimeKind::Plain => "txt",
        }
    }

    /// MIME type string for upload parts.
    pub fn mime_type(&self) -> &'static str {
        match self {
            MimeKind::Html => "text/html",
            MimeKind::Pdf => "application/pdf",
            MimeKind::Plain => "text/plain",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "html" => Some(MimeKind::Html),
            "pdf" => Some(MimeKind::Pdf),
            "txt" => Some(MimeKind::Plain),
            _ => None,
        }
    }
}

/// A filing persisted to the local cache. Never mutated after write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedDocument {
    pub filing_ref: FilingReference,
    pub local_path: PathBuf,
    pub byte_size: u64,
    pub mime_kind: MimeKind,
}

/// Cache file stem for a filing: `{TICKER}_{type}_{date}`, extension added
/// once the content kind is known.
fn cache_stem(ticker: &str, reference: &FilingReference) -> String {
    format!(
        "{}_{}_{}",
        ticker,
        reference.document_type.cache_label(),
        reference.filing_date
    )
}

/// Writes a response body verbatim to the cache and describes the result.
///
/// The extension is derived from the sniffed content kind. An existing file
/// with the same name is silently overwritten, which is idempotent by
/// content as long as the source filing hasn't changed.
pub fn store_document(
    cache_dir: &Path,
    ticker: &str,
    reference: &FilingReference,
    body: &[u8],
) -> Result<CachedDocument> {
    let mime_kind = MimeKind::sniff(body);
    fs::create_dir_all(cache_dir)?;

    let path = cache_dir.join(format!(
        "{}.{}",
        cache_stem(ticker, reference),
        mime_kind.extension()
    ));
    fs::write(&path, body)?;

    tracing::debug!(
        "Cached {} ({} bytes) at {}",
        reference.accession_key,
        body.len(),
        path.display()
    );

    Ok(CachedDocument {
        filing_ref: reference.clone(),
        local_path: path,
        byte_size: body.len() as u64,
        mime_kind,
    })
}

/// Looks for an existing non-empty cache file for a filing, any extension.
fn cached_on_disk(
    cache_dir: &Path,
    ticker: &str,
    reference: &FilingReference,
) -> Option<CachedDocument> {
    let stem = cache_stem(ticker, reference);
    for ext in ["html", "pdf", "txt"] {
        let path = cache_dir.join(format!("{}.{}", stem, ext));
        if let Ok(meta) = fs::metadata(&path) {
            if meta.len() > 0 {
                return Some(CachedDocument {
                    filing_ref: reference.clone(),
                    local_path: path,
                    byte_size: meta.len(),
                    mime_kind: MimeKind::from_extension(ext).unwrap_or(MimeKind::Plain),
                });
            }
        }
    }
    None
}

#[async_trait]
impl DownloaderOperations for Registry {
    /// Retrieves one filing into the cache.
    ///
    /// Returns `Ok(None)` when both the primary and alternate URL fail; the
    /// caller treats the filing as unavailable and moves on. Pacing against
    /// the registry host is enforced by the client's shared rate limiter.
    async fn download(
        &self,
        identity: &CompanyIdentity,
        reference: &FilingReference,
        run: &RunConfig,
    ) -> Result<Option<CachedDocument>> {
        let cache_dir = run.cache_root.join(&identity.ticker);

        if run.reuse_cache {
            if let Some(existing) = cached_on_disk(&cache_dir, &identity.ticker, reference) {
                tracing::debug!(
                    "Reusing cached {} at {}",
                    reference.accession_key,
                    existing.local_path.display()
                );
                return Ok(Some(existing));
            }
        }

        let primary_url = reference.source_url.clone().unwrap_or_else(|| {
            format!(
                "{}/data/{}/{}/{}-index.html",
                self.archives_url(),
                identity.canonical_id_unpadded(),
                reference.accession_key.replace('-', ""),
                reference.accession_key
            )
        });

        match self.get_bytes(&primary_url).await {
            Ok(body) => {
                let doc = store_document(&cache_dir, &identity.ticker, reference, &body)?;
                return Ok(Some(doc));
            }
            Err(e) => {
                tracing::warn!(
                    "Primary download failed for {} ({}), trying viewer URL",
                    reference.accession_key,
                    e
                );
            }
        }

        // One alternate attempt via the document viewer form, then give up.
        let viewer_url = format!(
            "{}/viewer?action=view&cik={}&accession_number={}&xbrl_type=v",
            self.browse_url(),
            identity.canonical_id,
            reference.accession_key
        );

        match self.get_bytes(&viewer_url).await {
            Ok(body) => {
                let doc = store_document(&cache_dir, &identity.ticker, reference, &body)?;
                Ok(Some(doc))
            }
            Err(e) => {
                tracing::warn!(
                    "Alternate download failed for {} ({}), filing omitted",
                    reference.accession_key,
                    e
                );
                Ok(None)
            }
        }
    }
}

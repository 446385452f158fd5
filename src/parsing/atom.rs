//! ATOM feed parser for the registry's per-company filing index.
//!
//! The registry's browse endpoint returns company filings as an ATOM feed of
//! `<entry>` blocks, each carrying a `content` element with the filing date,
//! filing type, and accession identifier. The accession tag is inconsistently
//! spelled across filing types (`accession-number` and the registry's own
//! `accession-nunber` variant appear in the wild), so both are modeled as
//! first-class fields and the locator treats them as equally valid.

use crate::error::Result;
use quick_xml::{Reader, de::from_reader};
use serde::{Deserialize, Serialize};

pub struct FeedParser {
    config: FeedConfig,
}

/// Configuration options for feed parsing.
#[derive(Default)]
pub struct FeedConfig {
    /// Optional limit on the number of entries to parse.
    pub max_entries: Option<usize>,
}

/// A parsed company filing feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeedDocument {
    pub title: String,
    #[serde(rename = "company-info", default)]
    pub company_info: Option<CompanyInfo>,
    pub updated: Option<String>,
    #[serde(rename = "entry", default)]
    pub entries: Vec<FeedEntry>,
}

/// Company header block returned with company-specific feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CompanyInfo {
    pub cik: Option<String>,
    pub conformed_name: Option<String>,
    pub assigned_sic: Option<String>,
    pub fiscal_year_end: Option<String>,
}

/// A single filing entry in the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub id: Option<String>,
    pub updated: Option<String>,
    #[serde(rename = "link", default)]
    pub links: Vec<Link>,
    #[serde(rename = "content")]
    pub content: Option<Content>,
    #[serde(default)]
    pub category: Option<Category>,
}

/// The filing metadata block inside an entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "@type")]
    pub content_type: Option<String>,
    #[serde(rename = "$text")]
    pub text: Option<String>,
    #[serde(rename = "accession-number")]
    pub accession_number: Option<String>,
    /// Misspelled accession tag emitted by the registry for some filing types.
    #[serde(rename = "accession-nunber")]
    pub accession_nunber: Option<String>,
    #[serde(rename = "filing-date")]
    pub filing_date: Option<String>,
    #[serde(rename = "filing-href")]
    pub filing_href: Option<String>,
    #[serde(rename = "filing-type")]
    pub filing_type: Option<String>,
    #[serde(rename = "file-number")]
    pub file_number: Option<String>,
    #[serde(rename = "form-name")]
    pub form_name: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "@href")]
    pub href: String,
    #[serde(rename = "@rel")]
    pub rel: Option<String>,
    #[serde(rename = "@type")]
    pub link_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "@term")]
    pub term: String,
    #[serde(rename = "@scheme")]
    pub scheme: Option<String>,
    #[serde(rename = "@label")]
    pub label: Option<String>,
}

impl FeedEntry {
    /// Returns either spelling of the accession tag, canonical one preferred.
    pub fn accession_tag(&self) -> Option<&str> {
        self.content.as_ref().and_then(|c| {
            c.accession_number
                .as_deref()
                .or(c.accession_nunber.as_deref())
        })
    }
}

impl FeedParser {
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    /// Parses ATOM feed content into a structured `FeedDocument`.
    ///
    /// Entry order is preserved as the registry returned it; the locator is
    /// responsible for window filtering and chronological sorting.
    pub fn parse(&self, content: &str) -> Result<FeedDocument> {
        let mut reader = Reader::from_str(content);
        let config = reader.config_mut();
        config.trim_text(true);

        let mut doc: FeedDocument = from_reader(reader.into_inner())?;

        if let Some(max) = self.config.max_entries {
            doc.entries.truncate(max);
        }

        Ok(doc)
    }
}

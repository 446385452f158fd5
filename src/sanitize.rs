//! Filing content sanitizer.
//!
//! Bounds the payload sent to the extraction service and biases it toward
//! structured content: script and style blocks are noise, and when a filing
//! contains HTML tables those are assumed to carry the financial statements,
//! so only the tables are kept. Prose-only filings are truncated instead.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::downloader::MimeKind;

/// Maximum characters kept when no table fragments are found.
const MAX_EXCERPT_CHARS: usize = 50_000;
/// Marker appended when prose content is truncated.
const TRUNCATION_MARKER: &str = "...";
/// Maximum table fragments concatenated into the excerpt.
const MAX_TABLE_FRAGMENTS: usize = 10;

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static TABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<table[^>]*>.*?</table>").unwrap());

/// Produces a bounded excerpt of a filing suitable for inline submission.
///
/// PDF content passes through untouched: the binary document is uploaded
/// directly by the extraction client and never sanitized as text. For HTML
/// and plain text, script/style blocks are stripped; if the document carries
/// table markup the first [`MAX_TABLE_FRAGMENTS`] tables are concatenated
/// verbatim, otherwise the content is cut at [`MAX_EXCERPT_CHARS`] characters
/// with a truncation marker appended.
pub fn sanitize(content: &str, kind: MimeKind) -> String {
    if kind == MimeKind::Pdf {
        return content.to_string();
    }

    let stripped = SCRIPT_RE.replace_all(content, "");
    let stripped = STYLE_RE.replace_all(&stripped, "");

    let tables: Vec<&str> = TABLE_RE
        .find_iter(&stripped)
        .take(MAX_TABLE_FRAGMENTS)
        .map(|m| m.as_str())
        .collect();

    if !tables.is_empty() {
        return tables.join("\n");
    }

    if stripped.chars().count() > MAX_EXCERPT_CHARS {
        let mut excerpt: String = stripped.chars().take(MAX_EXCERPT_CHARS).collect();
        excerpt.push_str(TRUNCATION_MARKER);
        return excerpt;
    }

    stripped.into_owned()
}

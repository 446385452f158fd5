use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the registry HTTP client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// User agent string for HTTP requests. The registry's fair access policy
    /// requires an identifying contact, e.g. "my_app/1.0 (me@example.com)".
    pub user_agent: String,
    /// Rate limit in requests per second. The default of 5 yields at least
    /// 200ms pacing between successive requests against the registry host.
    pub rate_limit: u32,
    /// Timeout for registry lookups (snapshot and feed queries).
    pub timeout: Duration,
    /// Timeout for filing document downloads, which can be large.
    pub download_timeout: Duration,
    /// Base URLs for the registry services.
    pub base_urls: RegistryUrls,
}

/// Base URLs for the registry services.
#[derive(Debug, Clone)]
pub struct RegistryUrls {
    /// Base URL for the filing archives.
    pub archives: String,
    /// Base URL for bulk files (the ticker snapshot).
    pub files: String,
    /// Base URL for the browse endpoint (company feed, document viewer).
    pub browse: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            user_agent: "filingkit/0.1.0".to_string(),
            rate_limit: 5,
            timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(60),
            base_urls: RegistryUrls::default(),
        }
    }
}

impl Default for RegistryUrls {
    fn default() -> Self {
        Self {
            archives: "https://www.sec.gov/Archives/edgar".to_string(),
            files: "https://www.sec.gov/files".to_string(),
            browse: "https://www.sec.gov/cgi-bin".to_string(),
        }
    }
}

/// Per-run settings for a single company analysis.
///
/// This replaces any process-wide demo toggle: callers construct one
/// `RunConfig` and pass it through the pipeline explicitly.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root directory for the on-disk filing cache.
    pub cache_root: PathBuf,
    /// Recency window applied when locating filings, in years.
    pub lookback_years: u32,
    /// Maximum filings downloaded per located document type.
    pub max_filings_per_type: usize,
    /// When true, skip the download if the cache file for a filing already
    /// exists and is non-empty. When false (the default), always re-download
    /// and overwrite, so every run sees the freshest copy.
    pub reuse_cache: bool,
    /// When true, take synthetic extraction records without calling the
    /// extraction service at all.
    pub use_synthetic_data: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::from("data/cache"),
            lookback_years: 3,
            max_filings_per_type: 3,
            reuse_cache: false,
            use_synthetic_data: false,
        }
    }
}

impl RunConfig {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            ..Self::default()
        }
    }

    pub fn with_lookback_years(mut self, years: u32) -> Self {
        self.lookback_years = years;
        self
    }

    pub fn with_max_filings_per_type(mut self, max: usize) -> Self {
        self.max_filings_per_type = max;
        self
    }

    pub fn with_reuse_cache(mut self, reuse: bool) -> Self {
        self.reuse_cache = reuse;
        self
    }

    pub fn with_synthetic_data(mut self, synthetic: bool) -> Self {
        self.use_synthetic_data = synthetic;
        self
    }
}

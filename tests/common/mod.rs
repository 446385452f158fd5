use std::time::Duration;

use filingkit::{Registry, RegistryConfig, RegistryUrls};

/// Ticker snapshot body in the registry's bulk listing format.
pub const TICKER_SNAPSHOT: &str = r#"{
    "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
    "1": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"}
}"#;

/// Builds a registry client pointed at a mock server.
pub fn registry_for(server_url: &str) -> Registry {
    let config = RegistryConfig {
        user_agent: "filingkit_tests/0.1 (tests@example.com)".to_string(),
        rate_limit: 100,
        timeout: Duration::from_secs(5),
        download_timeout: Duration::from_secs(5),
        base_urls: RegistryUrls {
            archives: format!("{}/Archives/edgar", server_url),
            files: format!("{}/files", server_url),
            browse: format!("{}/cgi-bin", server_url),
        },
    };
    Registry::with_config(config).unwrap()
}

/// Renders a company filing feed with one entry per (date, accession) pair.
#[allow(dead_code)]
pub fn company_feed(entries: &[(&str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(date, accession)| {
            format!(
                "<entry><title>filing</title>\
                 <id>urn:tag:sec.gov,2008:accession-number={accession}</id>\
                 <content type=\"text/xml\">\
                 <accession-number>{accession}</accession-number>\
                 <filing-date>{date}</filing-date>\
                 </content></entry>"
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
         <feed xmlns=\"http://www.w3.org/2005/Atom\">\
         <title>ACME CORP - filings</title>{body}</feed>"
    )
}

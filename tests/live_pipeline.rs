//! Live tests against the public registry. Run with `cargo test -- --ignored`
//! and a valid contact address in the user agent.

use filingkit::{
    DocumentType, ExtractionClient, FilingPipeline, Registry, ResolverOperations, RunConfig,
};

fn registry() -> Registry {
    Registry::new("filingkit_tests example@example.com").unwrap()
}

#[tokio::test]
#[ignore]
async fn live_resolve_apple() {
    let identity = registry().resolve("AAPL").await.unwrap();
    assert_eq!(identity.canonical_id, "0000320193");
    assert_eq!(identity.display_name, "Apple Inc.");
}

#[tokio::test]
#[ignore]
async fn live_latest_annual_report() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = FilingPipeline::new(
        registry(),
        ExtractionClient::new(None).unwrap(),
        RunConfig::new(dir.path()),
    );

    let path = pipeline
        .latest_filing("AAPL", DocumentType::AnnualReport)
        .await
        .unwrap()
        .expect("Apple files a 10-K every year");

    let meta = std::fs::metadata(&path).unwrap();
    assert!(meta.len() > 0);
}

#[tokio::test]
#[ignore]
async fn live_collect_bundle_offline_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let run = RunConfig::new(dir.path()).with_max_filings_per_type(1);
    let pipeline = FilingPipeline::new(registry(), ExtractionClient::new(None).unwrap(), run);

    let bundle = pipeline.collect("AAPL").await.unwrap();

    // No extraction credential: records are synthetic, documents are real.
    assert!(bundle.financial.is_fallback());
    assert!(!bundle.documents[&DocumentType::AnnualReport].is_empty());
}

mod common;

use chrono::{Duration, Utc};
use common::{TICKER_SNAPSHOT, company_feed, registry_for};
use filingkit::{
    DocumentType, ExtractionClient, FilingError, FilingPipeline, RecordSource, RunConfig,
    synthetic_record,
};
use mockito::Matcher;

fn days_ago(days: i64) -> String {
    (Utc::now().date_naive() - Duration::days(days)).to_string()
}

fn offline_extractor() -> ExtractionClient {
    ExtractionClient::new(None).unwrap()
}

async fn mock_snapshot(server: &mut mockito::ServerGuard) {
    server
        .mock("GET", "/files/company_tickers.json")
        .with_status(200)
        .with_body(TICKER_SNAPSHOT)
        .create_async()
        .await;
}

async fn mock_feed(server: &mut mockito::ServerGuard, form: &str, body: String) {
    server
        .mock("GET", "/cgi-bin/browse-edgar")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "getcompany".into()),
            Matcher::UrlEncoded("type".into(), form.into()),
        ]))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;
}

async fn mock_archive(server: &mut mockito::ServerGuard, accession: &str, body: &str) {
    let path = format!(
        "/Archives/edgar/data/320193/{}/{}-index.html",
        accession.replace('-', ""),
        accession
    );
    server
        .mock("GET", path.as_str())
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;
}

#[tokio::test]
async fn collect_builds_a_structurally_complete_bundle() {
    let mut server = mockito::Server::new_async().await;
    mock_snapshot(&mut server).await;

    // One annual report, no proxy statement, two event filings.
    let annual_acc = "0000320193-24-000001";
    let event_acc_1 = "0000320193-24-000002";
    let event_acc_2 = "0000320193-24-000003";

    mock_feed(
        &mut server,
        "10-K",
        company_feed(&[(&days_ago(60), annual_acc)]),
    )
    .await;
    mock_feed(&mut server, "DEF 14A", company_feed(&[])).await;
    mock_feed(
        &mut server,
        "8-K",
        company_feed(&[
            (&days_ago(10), event_acc_1),
            (&days_ago(40), event_acc_2),
        ]),
    )
    .await;

    mock_archive(&mut server, annual_acc, "<html>10-K index</html>").await;
    mock_archive(&mut server, event_acc_1, "<html>8-K one</html>").await;
    mock_archive(&mut server, event_acc_2, "<html>8-K two</html>").await;

    let dir = tempfile::tempdir().unwrap();
    let run = RunConfig::new(dir.path()).with_synthetic_data(true);
    let pipeline = FilingPipeline::new(registry_for(&server.url()), offline_extractor(), run);

    let bundle = pipeline.collect("AAPL").await.unwrap();

    assert_eq!(bundle.identity.canonical_id, "0000320193");
    assert_eq!(bundle.identity.display_name, "Apple Inc.");

    // Synthetic-data mode: every record is the documented fallback.
    assert_eq!(bundle.financial.source, RecordSource::Fallback);
    assert_eq!(
        bundle.financial.record,
        synthetic_record(DocumentType::AnnualReport)
    );
    assert_eq!(
        bundle.governance.record,
        synthetic_record(DocumentType::ProxyStatement)
    );
    assert_eq!(bundle.events.len(), 2);

    assert_eq!(bundle.documents[&DocumentType::AnnualReport].len(), 1);
    assert!(bundle.documents[&DocumentType::ProxyStatement].is_empty());
    assert_eq!(bundle.documents[&DocumentType::EventReport].len(), 2);

    // Cache layout: {root}/{TICKER}/{TICKER}_{type}_{date}.{ext}
    let annual = &bundle.documents[&DocumentType::AnnualReport][0];
    let name = annual.local_path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("AAPL_10-K_"));
    assert!(name.ends_with(".html"));
    assert!(annual.local_path.exists());
}

#[tokio::test]
async fn unknown_ticker_aborts_the_run() {
    let mut server = mockito::Server::new_async().await;
    mock_snapshot(&mut server).await;

    let dir = tempfile::tempdir().unwrap();
    let pipeline = FilingPipeline::new(
        registry_for(&server.url()),
        offline_extractor(),
        RunConfig::new(dir.path()),
    );

    let result = pipeline.collect("ZZZZ").await;
    assert!(matches!(result, Err(FilingError::TickerNotFound(_))));
}

#[tokio::test]
async fn failed_downloads_degrade_to_synthetic_records() {
    let mut server = mockito::Server::new_async().await;
    mock_snapshot(&mut server).await;

    // Filings are located but every download path fails.
    let acc = "0000320193-24-000009";
    mock_feed(&mut server, "10-K", company_feed(&[(&days_ago(30), acc)])).await;
    mock_feed(&mut server, "DEF 14A", company_feed(&[])).await;
    mock_feed(&mut server, "8-K", company_feed(&[])).await;
    server
        .mock("GET", Matcher::Regex(r"^/Archives/.*".to_string()))
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/cgi-bin/viewer")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let pipeline = FilingPipeline::new(
        registry_for(&server.url()),
        offline_extractor(),
        RunConfig::new(dir.path()),
    );

    let bundle = pipeline.collect("AAPL").await.unwrap();

    assert!(bundle.documents[&DocumentType::AnnualReport].is_empty());
    assert!(bundle.financial.is_fallback());
    assert!(bundle.governance.is_fallback());
    assert!(bundle.events.is_empty());
}

#[tokio::test]
async fn live_extraction_flows_through_the_bundle() {
    let mut registry_server = mockito::Server::new_async().await;
    let mut extraction_server = mockito::Server::new_async().await;
    mock_snapshot(&mut registry_server).await;

    let acc = "0000320193-24-000010";
    mock_feed(
        &mut registry_server,
        "10-K",
        company_feed(&[(&days_ago(30), acc)]),
    )
    .await;
    mock_feed(&mut registry_server, "DEF 14A", company_feed(&[])).await;
    mock_feed(&mut registry_server, "8-K", company_feed(&[])).await;
    mock_archive(&mut registry_server, acc, "<html><table>facts</table></html>").await;

    extraction_server
        .mock("POST", "/v1/ade/parse")
        .with_status(200)
        .with_body(r#"{"extracted_data": {"revenue_current": 9000000, "total_assets": 1}}"#)
        .create_async()
        .await;

    let extractor = ExtractionClient::new(Some("real-key".to_string()))
        .unwrap()
        .with_endpoint(format!("{}/v1/ade/parse", extraction_server.url()));

    let dir = tempfile::tempdir().unwrap();
    let pipeline = FilingPipeline::new(
        registry_for(&registry_server.url()),
        extractor,
        RunConfig::new(dir.path()),
    );

    let bundle = pipeline.collect("AAPL").await.unwrap();

    assert_eq!(bundle.financial.source, RecordSource::Live);
    assert_eq!(
        bundle.financial.record.as_financial().unwrap().revenue_current,
        9_000_000
    );
    // Governance still degrades: no proxy filing was available.
    assert!(bundle.governance.is_fallback());
}

#[tokio::test]
async fn latest_filing_returns_most_recent_cache_path() {
    let mut server = mockito::Server::new_async().await;
    mock_snapshot(&mut server).await;

    let newer = "0000320193-24-000021";
    let older = "0000320193-23-000022";
    mock_feed(
        &mut server,
        "10-K",
        company_feed(&[(&days_ago(300), older), (&days_ago(20), newer)]),
    )
    .await;
    mock_archive(&mut server, newer, "<html>newest</html>").await;

    let dir = tempfile::tempdir().unwrap();
    let pipeline = FilingPipeline::new(
        registry_for(&server.url()),
        offline_extractor(),
        RunConfig::new(dir.path()),
    );

    let path = pipeline
        .latest_filing("AAPL", DocumentType::AnnualReport)
        .await
        .unwrap()
        .expect("latest filing should be cached");

    assert_eq!(std::fs::read(&path).unwrap(), b"<html>newest</html>");
}

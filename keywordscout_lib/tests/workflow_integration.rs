use keywordscout_lib::searchad_api::Client;
use keywordscout_lib::{
    AdCredentials, DocumentCountClient, EnrichmentPipeline, KeywordMetricsClient,
    KeywordScoutError, LinkPattern, RankLocator, ResultLinkExtractor, RetryPolicy,
    SearchCredentials, SurfaceRank, SurfaceTable,
};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ad_credentials() -> AdCredentials {
    AdCredentials {
        api_key: "api-key".into(),
        secret_key: "secret-key".into(),
        customer_id: "1234567".into(),
    }
}

fn search_credentials() -> SearchCredentials {
    SearchCredentials {
        client_id: "client-id".into(),
        client_secret: "client-secret".into(),
    }
}

async fn mount_keywordstool(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/keywordstool"))
        .and(query_param("hintKeywords", "캠핑의자"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(include_str!("fixtures/keywordstool.json")),
        )
        .mount(server)
        .await;
}

// ============================================================================
// Enrichment workflow: seed -> related keywords -> document counts -> export
// ============================================================================

#[tokio::test]
async fn seed_to_export_end_to_end() {
    let server = MockServer::start().await;
    mount_keywordstool(&server).await;
    Mock::given(method("GET"))
        .and(path("/search/blog"))
        .and(query_param("query", "캠핑의자"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total": 1000, "start": 1, "display": 1, "items": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/blog"))
        .and(query_param("query", "캠핑의자추천"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let api = Client::with_base_urls(&server.uri(), &server.uri()).unwrap();
    let metrics = KeywordMetricsClient::new(api.clone(), RetryPolicy::none());
    let mut records = metrics
        .fetch_related("캠핑의자", &ad_credentials())
        .await
        .unwrap();
    assert_eq!(records.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let pipeline = EnrichmentPipeline::new(DocumentCountClient::new(api, RetryPolicy::none()))
        .with_delay(Duration::from_millis(1))
        .with_export_dir(dir.path());
    let run = pipeline.start_run();
    let outcome = pipeline
        .enrich(&mut records, &search_credentials(), &run)
        .await
        .unwrap();

    assert_eq!(outcome.processed, 2);
    assert_eq!(outcome.failed_lookups, 1);
    assert!(!outcome.cancelled);

    assert_eq!(records[0].related_keyword, "캠핑의자");
    assert_eq!(records[0].mobile_volume, 58100);
    assert_eq!(records[0].pc_volume, 12400);
    assert_eq!(records[0].total_volume, 70500);
    assert_eq!(records[0].document_count, Some(1000));
    assert_eq!(records[0].competition_ratio, Some(70.5));

    assert_eq!(records[1].pc_volume, 10);
    assert_eq!(records[1].total_volume, 350);
    assert_eq!(records[1].document_count, Some(0));
    assert_eq!(records[1].competition_ratio, Some(0.0));

    let progress = run.progress().poll();
    assert_eq!(progress.current, 2);
    assert_eq!(progress.total, 2);

    let export_path = outcome.export_path.expect("export written");
    let content = std::fs::read_to_string(&export_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("related_keyword,mobile_volume,pc_volume"));
    assert!(lines[1].starts_with("캠핑의자,58100,12400,70500,높음,1000,"));
    assert!(lines[2].starts_with("캠핑의자추천,340,10,350,중간,0,"));
}

#[tokio::test]
async fn rejected_credentials_fail_fast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/keywordstool"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "code": 1018, "message": "Invalid customer id"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = Client::with_base_urls(&server.uri(), &server.uri()).unwrap();
    let metrics = KeywordMetricsClient::new(api, RetryPolicy::default());
    let err = metrics
        .fetch_related("캠핑의자", &ad_credentials())
        .await
        .unwrap_err();
    match err {
        KeywordScoutError::UpstreamFormat(msg) => assert!(msg.contains("Invalid customer id")),
        other => panic!("unexpected: {other:?}"),
    }
}

// ============================================================================
// Rank detection over a captured result page
// ============================================================================

#[test]
fn extracts_post_links_from_result_page() {
    let extractor = ResultLinkExtractor::new(LinkPattern::default()).unwrap();
    let links = extractor.extract(include_str!("fixtures/search_results.html"));
    let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://blog.naver.com/campwolf/223100000001",
            "https://blog.naver.com/PostView.naver",
            "https://blog.naver.com/hikerkim/223100000003",
            "https://blog.naver.com/outdoorjin/223100000004",
            "https://blog.naver.com/alice/223012345678",
            "https://blog.naver.com/scriptonly/223100000005",
        ]
    );
}

#[test]
fn locates_target_on_result_page() {
    let extractor = ResultLinkExtractor::new(LinkPattern::default()).unwrap();
    let links = extractor.extract(include_str!("fixtures/search_results.html"));
    let locator = RankLocator::new(SurfaceTable::default());

    let report = locator.locate("http://www.blog.naver.com/alice/223012345678/", &links, &links);
    assert_eq!(report.featured_block, SurfaceRank::at(5));
    assert!(!report.organic_block.found);
    assert_eq!(report.dedicated_tab, SurfaceRank::at(5));

    let narrow = RankLocator::new(SurfaceTable {
        featured: keywordscout_lib::SurfaceWindow { offset: 0, width: 3 },
        organic: keywordscout_lib::SurfaceWindow { offset: 3, width: 20 },
        tab_cap: 4,
    });
    let report = narrow.locate("https://blog.naver.com/alice/223012345678", &links, &links);
    assert!(!report.featured_block.found);
    assert_eq!(report.organic_block, SurfaceRank::at(2));
    assert!(!report.dedicated_tab.found);
}

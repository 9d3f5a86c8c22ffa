use std::time::Duration;

use lastfive_core::{
    fallback, AnalysisRequest, Failure, HistoryStore, MemoryStore, ReportSource, RiskLevel,
    SessionState, TransportClient,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn report_json(product: &str) -> serde_json::Value {
    json!({
        "product_name": product,
        "risk_level": "danger",
        "risk_score": 71,
        "summary": "Mapping breaks in L-shaped rooms.",
        "defects": [{
            "category": "software",
            "description": "Map resets after updates",
            "severity": 7,
            "frequency": 32,
            "original_quotes": ["map reset again", "missed the living room", "three tries", "still wrong"]
        }],
        "noise_filtered": 12,
        "scenario_warnings": [],
        "history_events": [],
        "heatmap_data": [{"dimension": "Software bug", "complaint_count": 32, "severity_avg": 7.0, "percentage": 100.0}],
        "alternatives": [],
        "analyzed_reviews_count": 44,
        "data_sources": ["Zhihu"],
        "analysis_timestamp": "2024-06-01T08:00:00"
    })
}

fn client(server: &MockServer) -> TransportClient {
    TransportClient::new(&server.uri(), Duration::from_secs(5))
}

#[tokio::test]
async fn test_analyze_posts_request_and_decodes_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .and(body_json(json!({"product_name": "Robot X", "user_scenario": "two cats"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_json("Robot X")))
        .expect(1)
        .mount(&server)
        .await;

    let request = AnalysisRequest::new("Robot X", Some("two cats"));
    let report = client(&server).analyze(&request).await.unwrap();

    assert_eq!(report.product_name, "Robot X");
    assert_eq!(report.risk_level, RiskLevel::Danger);
    assert_eq!(report.defects[0].quotes.len(), 4);
}

#[tokio::test]
async fn test_null_scenario_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .and(body_json(json!({"product_name": "Kettle", "user_scenario": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_json("Kettle")))
        .expect(1)
        .mount(&server)
        .await;

    let request = AnalysisRequest::new("Kettle", None);
    assert!(client(&server).analyze(&request).await.is_ok());
}

#[tokio::test]
async fn test_non_success_status_is_service_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Agents not initialized"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .analyze(&AnalysisRequest::new("Kettle", None))
        .await
        .unwrap_err();
    assert!(matches!(err, Failure::Service { status: 500 }));
    assert_eq!(err.kind(), "service");
}

#[tokio::test]
async fn test_unreadable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .analyze(&AnalysisRequest::new("Kettle", None))
        .await
        .unwrap_err();
    assert!(matches!(err, Failure::Malformed(_)));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(report_json("Kettle"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = TransportClient::new(&server.uri(), Duration::from_millis(100));
    let err = client
        .analyze(&AnalysisRequest::new("Kettle", None))
        .await
        .unwrap_err();
    assert!(matches!(err, Failure::Timeout(_)));
    assert_eq!(err.kind(), "network");
}

#[tokio::test]
async fn test_unreachable_service_is_network_failure() {
    // Nothing listens on the discard port
    let client = TransportClient::new("http://127.0.0.1:9", Duration::from_secs(2));
    let err = client
        .analyze(&AnalysisRequest::new("Kettle", None))
        .await
        .unwrap_err();
    assert!(matches!(err, Failure::Network(_) | Failure::Timeout(_)));
}

#[tokio::test]
async fn test_health_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "version": "2.0.0",
            "langchain_enabled": true,
            "llm_provider": "deepseek",
            "agents": {"langchain_agent": true}
        })))
        .mount(&server)
        .await;

    let health = client(&server).health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version.as_deref(), Some("2.0.0"));
    assert!(health.langchain_enabled);
}

#[tokio::test]
async fn test_session_over_http_falls_back_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let service = client(&server);
    let mut session = SessionState::new();
    let mut history = HistoryStore::open(Box::new(MemoryStore::new()));

    session
        .submit_and_wait("投影仪A", &service, &mut history)
        .await
        .unwrap();

    let (_, rendered) = session.latest_report().unwrap();
    assert_eq!(rendered.source, ReportSource::Fallback);
    assert_eq!(*rendered.report, fallback::generate("投影仪A"));
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_session_over_http_uses_live_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_json("Robot X")))
        .expect(1)
        .mount(&server)
        .await;

    let service = client(&server);
    let mut session = SessionState::new();
    let mut history = HistoryStore::open(Box::new(MemoryStore::new()));

    session
        .submit_and_wait("Robot X", &service, &mut history)
        .await
        .unwrap();

    let (_, rendered) = session.latest_report().unwrap();
    assert_eq!(rendered.source, ReportSource::Live);
    assert_eq!(rendered.report.risk_score, 71);
    assert_eq!(history.entries()[0].risk_level, RiskLevel::Danger);
}

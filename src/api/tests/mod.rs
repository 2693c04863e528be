use super::*;
use crate::error::FetchFailure;
use crate::harvester::test_helpers::{
    PAGE_URL, StubFetcher, create_test_config, create_test_harvester, doc_url, links_page,
};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use std::time::Duration;
use tower::ServiceExt;

fn router_for(fetcher: StubFetcher, config: Config) -> Router {
    let (harvester, _store) = create_test_harvester(config.clone(), Arc::new(fetcher));
    create_router(Arc::new(harvester), Arc::new(config))
}

fn post_harvest(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/harvest")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = router_for(StubFetcher::new(), create_test_config());

    let request = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_routes_are_not_served_outside_prefix() {
    let app = router_for(StubFetcher::new(), create_test_config());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let app = router_for(StubFetcher::new(), create_test_config());

    let request = Request::builder()
        .uri("/api/v1/openapi.json")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json["paths"]["/api/v1/harvest"]["post"].is_object());
}

#[tokio::test]
async fn test_harvest_returns_report() {
    let fetcher = StubFetcher::new()
        .with_page(links_page(&["a.pdf", "b.pdf"]))
        .with_pdf(&doc_url("a.pdf"), b"%PDF-a")
        .with_failure(&doc_url("b.pdf"), FetchFailure::Status(404));
    let app = router_for(fetcher, create_test_config());

    let response = app
        .oneshot(post_harvest(format!(r#"{{"url":"{PAGE_URL}"}}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["successful"], 1);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["results"][0]["originalUrl"], doc_url("a.pdf"));
    assert_eq!(json["results"][0]["sizeBytes"], 6);
    assert_eq!(json["errors"][0]["url"], doc_url("b.pdf"));
    assert!(
        json["errors"][0]["errorMessage"]
            .as_str()
            .unwrap()
            .contains("404")
    );
}

#[tokio::test]
async fn test_harvest_without_url_is_bad_request() {
    let app = router_for(StubFetcher::new(), create_test_config());

    let response = app.oneshot(post_harvest("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "missing_url");
}

#[tokio::test]
async fn test_harvest_with_malformed_body_is_bad_request() {
    let app = router_for(StubFetcher::new(), create_test_config());

    let response = app.oneshot(post_harvest("not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_unreachable_page_is_bad_gateway() {
    let fetcher = StubFetcher::new().with_failure(PAGE_URL, FetchFailure::Status(500));
    let app = router_for(fetcher, create_test_config());

    let response = app
        .oneshot(post_harvest(format!(r#"{{"url":"{PAGE_URL}"}}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "page_unreachable");
    assert_eq!(json["error"]["details"]["url"], PAGE_URL);
}

#[tokio::test]
async fn test_page_without_documents_is_unprocessable() {
    let fetcher = StubFetcher::new().with_page("<html><body>empty</body></html>");
    let app = router_for(fetcher, create_test_config());

    let response = app
        .oneshot(post_harvest(format!(r#"{{"url":"{PAGE_URL}"}}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "no_documents_found");
}

#[tokio::test]
async fn test_cors_enabled() {
    let mut config = create_test_config();
    config.api.cors_enabled = true;
    config.api.cors_origins = vec!["*".to_string()];
    let app = router_for(StubFetcher::new(), config);

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let mut config = create_test_config();
    config.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = router_for(StubFetcher::new(), config);

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://allowed.example"
    );

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = create_test_config();
    config.api.cors_enabled = false;
    let app = router_for(StubFetcher::new(), config);

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_api_server_serves_over_tcp() {
    let fetcher = StubFetcher::new();
    let mut config = create_test_config();
    // Port 0 lets the OS pick a free port
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let (harvester, _store) = create_test_harvester(config.clone(), Arc::new(fetcher));
    let harvester = Arc::new(harvester);

    let handle = tokio::spawn({
        let harvester = harvester.clone();
        let config = Arc::new(config);
        async move { start_api_server(harvester, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!handle.is_finished(), "server exited early");

    handle.abort();
}

#[tokio::test]
async fn test_api_server_reports_bind_failure() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = create_test_config();
    config.api.bind_address = occupied.local_addr().unwrap();
    let (harvester, _store) = create_test_harvester(config.clone(), Arc::new(StubFetcher::new()));

    let result = start_api_server(Arc::new(harvester), Arc::new(config)).await;

    assert!(matches!(result, Err(crate::error::Error::Io(_))));
}

//! Health checks and request IDs.

use bizdesk_integration_tests::TestServer;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");

    let res = srv.get("/health/ready").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_generated_or_propagated() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/inventory").await;
    let generated = res.headers()["x-request-id"].to_str().unwrap().to_owned();
    assert_eq!(generated.len(), 36);

    let res = srv
        .client
        .get(srv.url("/inventory"))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "abc-123");

    // Errors carry it too
    let res = srv.get("/purchases/999/invoice").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().contains_key("x-request-id"));
}

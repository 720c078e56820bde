//! Employee endpoints.

use bizdesk_integration_tests::TestServer;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_create_and_search_employees() {
    let srv = TestServer::spawn().await;

    // 200, not 201
    let employee = srv
        .post_expect(
            "/employees",
            &json!({
                "name": "Grace Hopper",
                "role": "Engineer",
                "employmentType": "Full-Time",
                "status": "Active",
                "startDate": "2024-02-01",
                "salary": "85000.00"
            }),
            StatusCode::OK,
        )
        .await;
    assert_eq!(employee["employmentType"], "Full-Time");
    assert_eq!(employee["startDate"], "2024-02-01");
    assert_eq!(employee["endDate"], serde_json::Value::Null);

    srv.post_expect(
        "/employees",
        &json!({
            "name": "Alan Turing",
            "role": "Analyst",
            "employmentType": "Contract",
            "status": "On Leave",
            "startDate": "2023-06-15"
        }),
        StatusCode::OK,
    )
    .await;

    let hits = srv.get_ok("/employees?searchTerm=Leave").await;
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Alan Turing");

    let all = srv.get_ok("/employees").await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_employee_validation() {
    let srv = TestServer::spawn().await;

    let res = srv
        .post("/employees", &json!({"name": "Grace Hopper", "role": "Engineer"}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .post(
            "/employees",
            &json!({
                "name": "Grace Hopper",
                "role": "Engineer",
                "employmentType": "Full Time",
                "status": "Active",
                "startDate": "2024-02-01"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .post(
            "/employees",
            &json!({
                "name": "Grace Hopper",
                "role": "Engineer",
                "employmentType": "Full-Time",
                "status": "Resigned",
                "startDate": "2024-02-01",
                "endDate": "2023-12-31"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(srv.get_ok("/employees").await, json!([]));
}

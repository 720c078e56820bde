//! Inventory endpoints.

use bizdesk_integration_tests::{TestServer, error_message};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_create_then_list_inventory() {
    let srv = TestServer::spawn().await;

    let item = srv
        .post_expect(
            "/inventory",
            &json!({"name": "Widget", "unitCost": 2.5, "quantity": 10}),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(item["name"], "Widget");
    assert_eq!(item["quantity"], 10);
    assert!(item["id"].is_number());

    let items = srv.get_ok("/inventory").await;
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], item["id"]);
    assert_eq!(items[0]["quantity"], 10);
}

#[tokio::test]
async fn test_unit_cost_accepts_string_or_number() {
    let srv = TestServer::spawn().await;

    let item = srv
        .post_expect(
            "/inventory",
            &json!({"name": "Gasket", "unitCost": "0.75", "quantity": 0}),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(item["unitCost"], "0.75");
    assert_eq!(item["quantity"], 0);
}

#[tokio::test]
async fn test_inventory_validation() {
    let srv = TestServer::spawn().await;

    let body = srv
        .post_expect(
            "/inventory",
            &json!({"name": "Widget", "quantity": 10}),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert_eq!(error_message(&body), "name, unitCost, and quantity are required");

    let res = srv
        .post("/inventory", &json!({"name": "Widget", "unitCost": 1, "quantity": -1}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .post(srv.url("/inventory"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(srv.get_ok("/inventory").await, json!([]));
}

#[tokio::test]
async fn test_unit_cost_must_fit_whole_cents() {
    let srv = TestServer::spawn().await;

    for cost in ["2.555", "10000000000", "79228162514264337593543950335"] {
        let res = srv
            .post("/inventory", &json!({"name": "Widget", "unitCost": cost, "quantity": 5}))
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "unitCost {cost}");
    }
    assert_eq!(srv.get_ok("/inventory").await, json!([]));

    let item = srv
        .post_expect(
            "/inventory",
            &json!({"name": "Widget", "unitCost": "9999999999.99", "quantity": 5}),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(item["unitCost"], "9999999999.99");
}

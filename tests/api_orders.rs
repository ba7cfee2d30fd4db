mod common;

use axum::http::StatusCode;
use common::{get, put_json, put_raw, spawn_app};
use serde_json::{json, Value};

fn ids(rows: &Value) -> Vec<i64> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|r| r["order_id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn list_includes_orphans_with_null_customer() {
    let app = spawn_app().await;
    let (status, body) = get(&app.router, "/api/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["orders"]), vec![105, 123, 103, 102, 101, 100]);
    assert_eq!(body["pagination"]["total"], 6);
    assert_eq!(body["orders"][0]["first_name"], Value::Null);
    assert_eq!(body["orders"][1]["first_name"], "Bob");
}

#[tokio::test]
async fn list_filters_by_status_and_user() {
    let app = spawn_app().await;
    let (_, body) = get(&app.router, "/api/orders?status=Pending").await;
    assert_eq!(ids(&body["orders"]), vec![105, 123]);
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = get(&app.router, "/api/orders?user_id=1&per_page=1").await;
    assert_eq!(ids(&body["orders"]), vec![101]);
    assert_eq!(body["pagination"]["pages"], 2);

    let (status, _) = get(&app.router, "/api/orders?user_id=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detail_and_not_found() {
    let app = spawn_app().await;
    let (status, body) = get(&app.router, "/api/orders/102").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Cancelled");
    assert_eq!(body["num_of_item"], 3);
    assert_eq!(body["state"], "MA");

    let (status, body) = get(&app.router, "/api/orders/424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Order not found"}));
}

#[tokio::test]
async fn delivered_sets_only_its_timestamp() {
    let app = spawn_app().await;
    let (status, body) = put_json(
        &app.router,
        "/api/orders/123",
        json!({"status": "Delivered"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order = &body["order"];
    assert_eq!(order["status"], "Delivered");
    assert!(order["delivered_at"].is_string());
    assert_eq!(order["shipped_at"], Value::Null);
    assert_eq!(order["returned_at"], Value::Null);
    assert_eq!(order["num_of_item"], 3);

    let (_, body) = get(&app.router, "/api/orders/123").await;
    assert_eq!(body["status"], "Delivered");
}

#[tokio::test]
async fn item_count_round_trips() {
    let app = spawn_app().await;
    let (status, _) = put_json(
        &app.router,
        "/api/orders/102",
        json!({"status": "Pending", "num_of_item": 7}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = get(&app.router, "/api/orders/102").await;
    assert_eq!(body["num_of_item"], 7);
    assert_eq!(body["status"], "Pending");
}

#[tokio::test]
async fn update_validation() {
    let app = spawn_app().await;
    let cases = [
        json!({}),
        json!({"status": "Lost"}),
        json!({"status": "Shipped", "num_of_item": -1}),
    ];
    for body in cases {
        let (status, reply) = put_json(&app.router, "/api/orders/100", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(reply["error"].is_string());
    }

    let (status, reply) = put_raw(&app.router, "/api/orders/100", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(reply["error"].is_string());

    let (status, _) = put_json(
        &app.router,
        "/api/orders/999999",
        json!({"status": "Shipped"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_update_reports_partial_failure() {
    let app = spawn_app().await;
    let (status, body) = put_json(
        &app.router,
        "/api/orders/bulk/status",
        json!({"updates": [
            {"order_id": 123, "status": "Shipped"},
            {"order_id": 999999, "status": "Delivered"}
        ]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated_count"], 1);
    assert_eq!(body["requested"], 2);
    assert_eq!(body["errors"], json!(["Order 999999 not found"]));

    let (_, order) = get(&app.router, "/api/orders/123").await;
    assert_eq!(order["status"], "Shipped");
    assert!(order["shipped_at"].is_string());
}

#[tokio::test]
async fn bulk_update_accepts_bare_array_and_reports_bad_status() {
    let app = spawn_app().await;
    let (status, body) = put_json(
        &app.router,
        "/api/orders/bulk/status",
        json!([
            {"order_id": 101, "status": "Delivered"},
            {"order_id": 102, "status": "Teleported"}
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated_count"], 1);
    assert_eq!(
        body["errors"],
        json!(["Invalid status 'Teleported' for order 102"])
    );
}

#[tokio::test]
async fn bulk_update_skips_malformed_entries() {
    let app = spawn_app().await;
    let (status, body) = put_json(
        &app.router,
        "/api/orders/bulk/status",
        json!({"updates": [
            {"order_id": "x", "status": "Shipped"},
            {"order_id": 101, "status": "Delivered"},
            {"order_id": 102}
        ]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requested"], 3);
    assert_eq!(body["updated_count"], 1);
    assert_eq!(
        body["errors"],
        json!(["Update 1 has no valid order_id", "Missing status for order 102"])
    );

    let (_, order) = get(&app.router, "/api/orders/101").await;
    assert_eq!(order["status"], "Delivered");
}

#[tokio::test]
async fn bulk_update_limits() {
    let app = spawn_app().await;
    let (status, _) = put_json(&app.router, "/api/orders/bulk/status", json!({"updates": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let many: Vec<Value> = (0..101)
        .map(|i| json!({"order_id": i, "status": "Pending"}))
        .collect();
    let (status, _) = put_json(&app.router, "/api/orders/bulk/status", json!(many)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

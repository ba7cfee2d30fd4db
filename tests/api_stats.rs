mod common;

use axum::http::StatusCode;
use common::{get, spawn_app};
use serde_json::json;

#[tokio::test]
async fn health_and_version() {
    let app = spawn_app().await;
    let (status, body) = get(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert!(body["timestamp"].is_string());

    let (status, body) = get(&app.router, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "ecommerce-api");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = spawn_app().await;
    let (status, body) = get(&app.router, "/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Resource not found"}));
}

#[tokio::test]
async fn overview_counts_and_rates() {
    let app = spawn_app().await;
    let (status, body) = get(&app.router, "/api/stats/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_customers"], 4);
    assert_eq!(body["total_orders"], 6);
    assert_eq!(body["status_distribution"]["Pending"], 2);
    assert_eq!(body["delivery_rate"], 16.67);
    assert_eq!(body["average_items_per_order"], 2.5);
    assert_eq!(body["top_cities"][0], json!({"city": "Austin", "count": 2}));
}

#[tokio::test]
async fn customer_demographics() {
    let app = spawn_app().await;
    let (status, body) = get(&app.router, "/api/stats/customers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gender_distribution"], json!({"F": 2, "M": 2}));
    let groups: Vec<&str> = body["age_distribution"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["age_group"].as_str().unwrap())
        .collect();
    assert_eq!(groups, vec!["18-24", "25-34", "45-54", "65+"]);
    assert_eq!(body["traffic_sources"][0]["traffic_source"], "Search");
    assert_eq!(body["top_customers"][0]["id"], 1);
    assert_eq!(body["top_customers"][0]["order_count"], 2);
}

#[tokio::test]
async fn order_trends() {
    let app = spawn_app().await;
    let (status, body) = get(&app.router, "/api/stats/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["monthly_trends"],
        json!([
            {"month": "2023-01", "count": 1},
            {"month": "2023-02", "count": 2},
            {"month": "2023-03", "count": 3}
        ])
    );
    assert_eq!(body["average_delivery_days"], 3.0);
    // no city has more than ten orders
    assert_eq!(body["city_stats"], json!([]));
}

#[tokio::test]
async fn analytics_summary() {
    let app = spawn_app().await;
    let (status, body) = get(&app.router, "/api/orders/analytics/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["monthly_trends"][0],
        json!({
            "month": "2023-01",
            "total_orders": 1,
            "delivered_orders": 1,
            "delivery_rate": 100.0,
            "total_items": 2
        })
    );
    assert_eq!(
        body["delivery_timeline"],
        json!({"delivered_orders": 1, "average_days": 3.0, "min_days": 3.0, "max_days": 3.0})
    );
    let first_city = &body["city_distribution"][0];
    assert_eq!(first_city["city"], "Austin");
    assert_eq!(first_city["order_count"], 3);
    assert_eq!(first_city["percentage"], 50.0);
}

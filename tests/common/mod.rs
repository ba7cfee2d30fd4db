//! Shared fixture: a temp SQLite file seeded through the loader, and request helpers.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response, StatusCode},
    Router,
};
use ecommerce_api::{app, load_files, AppConfig, AppState, ConnectionFactory, LoadReport};
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

pub const USERS_CSV: &str = "\
id,first_name,last_name,email,age,gender,state,street_address,postal_code,city,country,latitude,longitude,traffic_source,created_at
1,Ann,Lee,ann@example.com,31,F,TX,1 Main St,73301,Austin,United States,30.27,-97.74,Search,2022-01-01 09:00:00
2,Bob,Ray,bob@example.com,45,M,MA,2 Elm St,02108,Boston,United States,42.36,-71.06,Organic,2022-02-01 09:00:00
3,Cara,Diaz,cara@example.com,22,F,TX,3 Oak St,73301,Austin,United States,30.27,-97.74,Search,2022-03-01 09:00:00
4,Dan,Wu,,67,M,CO,4 Pine St,80202,Denver,United States,39.74,-104.99,Email,2022-04-01 09:00:00
";

pub const ORDERS_CSV: &str = "\
order_id,user_id,status,gender,created_at,returned_at,shipped_at,delivered_at,num_of_item
100,1,Delivered,F,2023-01-05 10:00:00,,2023-01-06 10:00:00,2023-01-08 10:00:00,2
101,1,Shipped,F,2023-02-10 10:00:00,,2023-02-11 10:00:00,,1
102,2,Cancelled,M,2023-02-15 10:00:00,,,,3
103,3,Returned,F,2023-03-01 10:00:00,2023-03-10 10:00:00,2023-03-02 10:00:00,2023-03-04 10:00:00,1
123,2,Pending,M,2023-03-20 10:00:00,,,,3
105,99,Pending,M,2023-03-21 10:00:00,,,,5
";

pub struct TestApp {
    _dir: TempDir,
    pub db_path: PathBuf,
    pub router: Router,
    pub report: LoadReport,
}

/// Load the fixture CSVs into a fresh database and build the router over it.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(AppConfig::default()).await
}

/// Same fixture, with `config` supplying everything but the database path.
pub async fn spawn_app_with(config: AppConfig) -> TestApp {
    let dir = TempDir::new().unwrap();
    let users = dir.path().join("users.csv");
    let orders = dir.path().join("orders.csv");
    std::fs::write(&users, USERS_CSV).unwrap();
    std::fs::write(&orders, ORDERS_CSV).unwrap();
    let db_path = dir.path().join("test.db");

    let report = load_files(&ConnectionFactory::create(&db_path), &users, &orders)
        .await
        .unwrap();
    let config = AppConfig {
        database_path: db_path.clone(),
        ..config
    };
    let router = app(AppState::new(ConnectionFactory::open(&db_path)), &config);
    TestApp {
        _dir: dir,
        db_path,
        router,
        report,
    }
}

/// Raw response, for tests that look at headers.
pub async fn request(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

/// Status plus body as JSON; a non-JSON body comes back as a JSON string.
pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = request(router, req).await;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn put_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    put_raw(router, uri, &body.to_string()).await
}

pub async fn put_raw(router: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::put(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

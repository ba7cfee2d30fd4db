mod common;

use common::{spawn_app, ORDERS_CSV, USERS_CSV};
use ecommerce_api::{load_files, ConnectionFactory, LoadError};
use tempfile::TempDir;

#[tokio::test]
async fn fixture_loads_every_row() {
    let app = spawn_app().await;
    let report = &app.report;
    assert_eq!(report.users.loaded, 4);
    assert_eq!(report.users.skipped, 0);
    assert_eq!(report.orders.loaded, 6);
    assert_eq!(report.quality.users_total, 4);
    assert_eq!(report.quality.null_emails, 1);
    assert_eq!(report.quality.orphaned_orders, 1);
    assert_eq!(report.quality.status_distribution.get("Pending"), Some(&2));
}

#[tokio::test]
async fn fixture_analysis_after_load() {
    let app = spawn_app().await;
    let analysis = &app.report.analysis;

    let cities: Vec<(Option<&str>, i64)> = analysis
        .top_cities
        .iter()
        .map(|c| (c.city.as_deref(), c.count))
        .collect();
    assert_eq!(
        cities,
        vec![(Some("Austin"), 2), (Some("Boston"), 1), (Some("Denver"), 1)]
    );

    let first = &analysis.status_percentages[0];
    assert_eq!((first.status.as_str(), first.count, first.percentage), ("Pending", 2, 33.33));
    assert_eq!(analysis.status_percentages.len(), 5);
    assert!(analysis.status_percentages[1..]
        .iter()
        .all(|share| share.count == 1 && share.percentage == 16.67));
    assert_eq!(analysis.average_items_per_order, 2.5);

    let json = serde_json::to_value(&app.report).unwrap();
    assert_eq!(json["analysis"]["top_cities"][0]["city"], "Austin");
}

#[tokio::test]
async fn row_count_matches_loaded_modulo_skipped() {
    let dir = TempDir::new().unwrap();
    let users = dir.path().join("users.csv");
    let orders = dir.path().join("orders.csv");
    let mut users_text = USERS_CSV.to_string();
    users_text.push_str("5,,Blank,blank@example.com,30,F,,,,,,,,,\n");
    users_text.push_str("6,Dup,Mail,ann@example.com,30,F,,,,,,,,,\n");
    users_text.push_str("7,Too,Few\n");
    std::fs::write(&users, users_text).unwrap();
    std::fs::write(&orders, ORDERS_CSV).unwrap();

    let db = dir.path().join("rows.db");
    let report = load_files(&ConnectionFactory::create(&db), &users, &orders)
        .await
        .unwrap();
    assert_eq!(report.users.loaded + report.users.skipped, 7);
    assert_eq!(report.users.skipped, 3);
    assert_eq!(report.quality.users_total as u64, report.users.loaded);
}

#[tokio::test]
async fn reload_replaces_tables() {
    let app = spawn_app().await;
    let dir = TempDir::new().unwrap();
    let users = dir.path().join("users.csv");
    let orders = dir.path().join("orders.csv");
    std::fs::write(&users, "id,first_name,last_name\n1,Solo,User\n").unwrap();
    std::fs::write(&orders, "order_id,user_id,status\n1,1,Pending\n").unwrap();

    let report = load_files(&ConnectionFactory::open(&app.db_path), &users, &orders)
        .await
        .unwrap();
    assert_eq!(report.quality.users_total, 1);
    assert_eq!(report.quality.orders_total, 1);
    assert_eq!(report.quality.orphaned_orders, 0);
}

#[tokio::test]
async fn missing_required_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let users = dir.path().join("users.csv");
    let orders = dir.path().join("orders.csv");
    std::fs::write(&users, USERS_CSV).unwrap();
    std::fs::write(&orders, "order_id,status\n1,Pending\n").unwrap();

    let err = load_files(
        &ConnectionFactory::create(&dir.path().join("x.db")),
        &users,
        &orders,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        LoadError::MissingColumn {
            table: "orders",
            column: "user_id"
        }
    ));
}

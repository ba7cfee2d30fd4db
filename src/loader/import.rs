//! Table import: read CSV rows, insert them in one transaction per table,
//! then report counts and data-quality figures.

use super::record::{Columns, OrderColumns, UserColumns};
use crate::error::LoadError;
use crate::models::{CityCount, StatusDistribution};
use crate::response::{percentage, rounded_or_zero};
use crate::store::{self, ConnectionFactory};
use serde::Serialize;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::{Connection, SqliteConnection};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const INSERT_USER: &str = "INSERT INTO users (id, first_name, last_name, email, age, gender, \
     state, street_address, postal_code, city, country, latitude, longitude, traffic_source, \
     created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const INSERT_ORDER: &str = "INSERT INTO orders (order_id, user_id, status, gender, created_at, \
     returned_at, shipped_at, delivered_at, num_of_item) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub loaded: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityReport {
    pub users_total: i64,
    pub orders_total: i64,
    pub null_emails: i64,
    /// Orders whose `user_id` matches no user.
    pub orphaned_orders: i64,
    pub status_distribution: StatusDistribution,
}

/// Cities listed in the post-load analysis.
const ANALYSIS_TOP_CITIES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: String,
    pub count: i64,
    /// Share of all orders, 2 decimals.
    pub percentage: f64,
}

/// Summary figures computed right after a load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Cities with the most users.
    pub top_cities: Vec<CityCount>,
    pub status_percentages: Vec<StatusShare>,
    pub average_items_per_order: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub users: TableReport,
    pub orders: TableReport,
    pub quality: QualityReport,
    pub analysis: AnalysisReport,
}

enum Insert {
    Done,
    Duplicate(String),
}

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

async fn insert(query: SqliteQuery<'_>, conn: &mut SqliteConnection) -> Result<Insert, LoadError> {
    match query.execute(&mut *conn).await {
        Ok(_) => Ok(Insert::Done),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Ok(Insert::Duplicate(e.message().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn skip(table: &'static str, line: u64, reason: &dyn std::fmt::Display, report: &mut TableReport) {
    tracing::warn!(table, line, reason = %reason, "skipping row");
    report.skipped += 1;
}

/// Replace the `users` table with the rows of `source`.
///
/// The header is checked before anything is dropped; a missing required
/// column leaves the existing table untouched.
pub async fn load_users<R: Read>(
    conn: &mut SqliteConnection,
    source: R,
) -> Result<TableReport, LoadError> {
    let mut reader = csv::Reader::from_reader(source);
    let columns = UserColumns::resolve(&Columns::from_headers(reader.headers()?))?;

    let mut tx = conn.begin().await?;
    store::recreate_users_table(&mut *tx).await?;
    let mut report = TableReport::default();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                skip("users", line, &e, &mut report);
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line());
        let user = match columns.parse(&record) {
            Ok(u) => u,
            Err(e) => {
                skip("users", line, &e, &mut report);
                continue;
            }
        };
        let query = sqlx::query(INSERT_USER)
            .bind(user.id)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.email)
            .bind(user.age)
            .bind(user.gender)
            .bind(user.state)
            .bind(user.street_address)
            .bind(user.postal_code)
            .bind(user.city)
            .bind(user.country)
            .bind(user.latitude)
            .bind(user.longitude)
            .bind(user.traffic_source)
            .bind(user.created_at);
        match insert(query, &mut *tx).await? {
            Insert::Done => report.loaded += 1,
            Insert::Duplicate(reason) => skip("users", line, &reason, &mut report),
        }
    }
    tx.commit().await?;
    tracing::info!(loaded = report.loaded, skipped = report.skipped, "users loaded");
    Ok(report)
}

/// Replace the `orders` table with the rows of `source`. `user_id` is not
/// checked against `users`; orphans show up in the quality report.
pub async fn load_orders<R: Read>(
    conn: &mut SqliteConnection,
    source: R,
) -> Result<TableReport, LoadError> {
    let mut reader = csv::Reader::from_reader(source);
    let columns = OrderColumns::resolve(&Columns::from_headers(reader.headers()?))?;

    let mut tx = conn.begin().await?;
    store::recreate_orders_table(&mut *tx).await?;
    let mut report = TableReport::default();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                skip("orders", line, &e, &mut report);
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line());
        let order = match columns.parse(&record) {
            Ok(o) => o,
            Err(e) => {
                skip("orders", line, &e, &mut report);
                continue;
            }
        };
        let query = sqlx::query(INSERT_ORDER)
            .bind(order.order_id)
            .bind(order.user_id)
            .bind(order.status.as_str())
            .bind(order.gender)
            .bind(order.created_at)
            .bind(order.returned_at)
            .bind(order.shipped_at)
            .bind(order.delivered_at)
            .bind(order.num_of_item);
        match insert(query, &mut *tx).await? {
            Insert::Done => report.loaded += 1,
            Insert::Duplicate(reason) => skip("orders", line, &reason, &mut report),
        }
    }
    tx.commit().await?;
    tracing::info!(loaded = report.loaded, skipped = report.skipped, "orders loaded");
    Ok(report)
}

/// Row counts and consistency checks over the loaded tables.
pub async fn verify(conn: &mut SqliteConnection) -> Result<QualityReport, LoadError> {
    let users_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *conn)
        .await?;
    let orders_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&mut *conn)
        .await?;
    let null_emails: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email IS NULL")
        .fetch_one(&mut *conn)
        .await?;
    let orphaned_orders: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders o LEFT JOIN users u ON o.user_id = u.id WHERE u.id IS NULL",
    )
    .fetch_one(&mut *conn)
    .await?;
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
            .fetch_all(&mut *conn)
            .await?;
    if orphaned_orders > 0 {
        tracing::warn!(orphaned_orders, "orders reference missing users");
    }
    Ok(QualityReport {
        users_total,
        orders_total,
        null_emails,
        orphaned_orders,
        status_distribution: rows.into_iter().collect(),
    })
}

/// Top cities by user count, each status's share of all orders, and the
/// average item count over orders that record one.
pub async fn analyze(conn: &mut SqliteConnection) -> Result<AnalysisReport, LoadError> {
    let top_cities = sqlx::query_as::<_, CityCount>(
        "SELECT city, COUNT(*) AS count FROM users \
         GROUP BY city ORDER BY count DESC, city ASC LIMIT ?",
    )
    .bind(ANALYSIS_TOP_CITIES)
    .fetch_all(&mut *conn)
    .await?;

    let orders_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&mut *conn)
        .await?;
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) AS count FROM orders \
         GROUP BY status ORDER BY count DESC, status ASC",
    )
    .fetch_all(&mut *conn)
    .await?;
    let status_percentages = rows
        .into_iter()
        .map(|(status, count)| StatusShare {
            status,
            count,
            percentage: percentage(count, orders_total),
        })
        .collect();

    let avg_items: Option<f64> =
        sqlx::query_scalar("SELECT AVG(num_of_item) FROM orders WHERE num_of_item IS NOT NULL")
            .fetch_one(&mut *conn)
            .await?;

    Ok(AnalysisReport {
        top_cities,
        status_percentages,
        average_items_per_order: rounded_or_zero(avg_items),
    })
}

fn open_source(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Source {
        path: path.display().to_string(),
        source,
    })
}

/// Load both files into the database behind `factory`, build indexes and verify.
/// Both sources are opened before any table is touched.
pub async fn load_files(
    factory: &ConnectionFactory,
    users_csv: &Path,
    orders_csv: &Path,
) -> Result<LoadReport, LoadError> {
    let users_file = open_source(users_csv)?;
    let orders_file = open_source(orders_csv)?;

    let mut conn = factory.connect().await?;
    tracing::info!(path = %users_csv.display(), "loading users");
    let users = load_users(&mut conn, users_file).await?;
    tracing::info!(path = %orders_csv.display(), "loading orders");
    let orders = load_orders(&mut conn, orders_file).await?;
    store::ensure_indexes(&mut conn).await?;
    let quality = verify(&mut conn).await?;
    let analysis = analyze(&mut conn).await?;
    Ok(LoadReport {
        users,
        orders,
        quality,
        analysis,
    })
}

//! SQLite file access: per-request connection factory and table DDL for `users` / `orders`.

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::ConnectOptions;
use std::path::Path;

/// Opens one connection per call. Held in application state instead of a pool;
/// every request owns its connection and drops it before the response is sent.
#[derive(Clone, Debug)]
pub struct ConnectionFactory {
    options: SqliteConnectOptions,
}

impl ConnectionFactory {
    /// Factory for an existing database file (serving).
    pub fn open(path: &Path) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            // user_id is a soft reference; orphans are reported, never rejected
            .foreign_keys(false);
        ConnectionFactory { options }
    }

    /// Factory that creates the file if needed (loading).
    pub fn create(path: &Path) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(false);
        ConnectionFactory { options }
    }

    pub async fn connect(&self) -> Result<SqliteConnection, sqlx::Error> {
        self.options.connect().await
    }
}

const USERS_DDL: &str = r#"
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT UNIQUE,
        age INTEGER,
        gender TEXT,
        state TEXT,
        street_address TEXT,
        postal_code TEXT,
        city TEXT,
        country TEXT,
        latitude REAL,
        longitude REAL,
        traffic_source TEXT,
        created_at TIMESTAMP
    )
"#;

const ORDERS_DDL: &str = r#"
    CREATE TABLE orders (
        order_id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL,
        status TEXT NOT NULL,
        gender TEXT,
        created_at TIMESTAMP,
        returned_at TIMESTAMP,
        shipped_at TIMESTAMP,
        delivered_at TIMESTAMP,
        num_of_item INTEGER
    )
"#;

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
    "CREATE INDEX IF NOT EXISTS idx_users_city ON users(city)",
    "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)",
];

/// Drop and recreate `users`. Existing rows are discarded.
pub async fn recreate_users_table(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DROP TABLE IF EXISTS users").execute(&mut *conn).await?;
    sqlx::query(USERS_DDL).execute(&mut *conn).await?;
    Ok(())
}

/// Drop and recreate `orders`. Existing rows are discarded.
pub async fn recreate_orders_table(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DROP TABLE IF EXISTS orders").execute(&mut *conn).await?;
    sqlx::query(ORDERS_DDL).execute(&mut *conn).await?;
    Ok(())
}

/// Create the lookup indexes. Both tables must exist.
pub async fn ensure_indexes(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    for ddl in INDEXES {
        tracing::debug!(sql = %ddl, "ddl");
        sqlx::query(ddl).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Liveness check used by `/health`.
pub async fn ping(factory: &ConnectionFactory) -> Result<(), sqlx::Error> {
    let mut conn = factory.connect().await?;
    sqlx::query("SELECT 1").fetch_one(&mut conn).await?;
    Ok(())
}

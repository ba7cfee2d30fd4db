//! Typed settings shared by the loader and the HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_PATH: &str = "ecommerce.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_USERS_CSV: &str = "users.csv";
pub const DEFAULT_ORDERS_CSV: &str = "orders.csv";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// SQLite file holding the `users` and `orders` tables.
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub users_csv: PathBuf,
    pub orders_csv: PathBuf,
    /// Upper bound for request bodies (bulk updates are the largest).
    pub body_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            users_csv: PathBuf::from(DEFAULT_USERS_CSV),
            orders_csv: PathBuf::from(DEFAULT_ORDERS_CSV),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

//! E-commerce data service: CSV loader plus a JSON API over SQLite.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, ConfigError, LoadError};
pub use loader::{load_files, LoadReport};
pub use routes::{api_routes, app, common_routes};
pub use state::AppState;
pub use store::ConnectionFactory;

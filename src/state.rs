//! Shared application state for all routes. Holds no connections, only how to open one.

use crate::store::ConnectionFactory;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: ConnectionFactory,
}

impl AppState {
    pub fn new(db: ConnectionFactory) -> Self {
        AppState { db }
    }
}

//! Query services over one borrowed connection. Handlers own the connection.

mod analytics;
mod customers;
mod orders;
mod validation;
pub use analytics::AnalyticsService;
pub use customers::CustomerService;
pub use orders::OrderService;
pub use validation::{RequestValidator, StatusChange};

use crate::sql::BindValue;
use sqlx::sqlite::{Sqlite, SqliteArguments};

type SqliteQueryAs<'q, T> = sqlx::query::QueryAs<'q, Sqlite, T, SqliteArguments<'q>>;
type SqliteQueryScalar<'q, T> = sqlx::query::QueryScalar<'q, Sqlite, T, SqliteArguments<'q>>;

fn bind_all<'q, T>(mut query: SqliteQueryAs<'q, T>, params: &[BindValue]) -> SqliteQueryAs<'q, T> {
    for p in params {
        query = query.bind(p.clone());
    }
    query
}

fn bind_all_scalar<'q, T>(
    mut query: SqliteQueryScalar<'q, T>,
    params: &[BindValue],
) -> SqliteQueryScalar<'q, T> {
    for p in params {
        query = query.bind(p.clone());
    }
    query
}

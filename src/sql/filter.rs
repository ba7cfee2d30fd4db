//! WHERE-clause assembly from named optional filters, and the sort allow-list.
//! Column names come from this module only; every user value is a bound parameter.

use crate::error::AppError;
use crate::sql::BindValue;
use serde::Serialize;
use std::str::FromStr;

/// Parameterized SQL fragment plus its values in placeholder order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub params: Vec<BindValue>,
}

/// Collects predicates joined with `AND`. Unset filters add nothing.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    predicates: Vec<String>,
    params: Vec<BindValue>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = ?`
    pub fn eq(mut self, column: &'static str, value: Option<impl Into<BindValue>>) -> Self {
        if let Some(v) = value {
            self.predicates.push(format!("{} = ?", column));
            self.params.push(v.into());
        }
        self
    }

    /// `column LIKE '%value%'`
    pub fn contains(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.predicates.push(format!("{} LIKE ?", column));
            self.params.push(BindValue::Text(like_pattern(v)));
        }
        self
    }

    /// `(a LIKE ? OR b LIKE ? ...)` with the same substring for every column.
    pub fn contains_any(mut self, columns: &[&'static str], value: Option<&str>) -> Self {
        if let (Some(v), false) = (value, columns.is_empty()) {
            let pattern = like_pattern(v);
            let ors: Vec<String> = columns.iter().map(|c| format!("{} LIKE ?", c)).collect();
            self.predicates.push(format!("({})", ors.join(" OR ")));
            for _ in columns {
                self.params.push(BindValue::Text(pattern.clone()));
            }
        }
        self
    }

    /// Finish into ` WHERE ...` (leading space) or an empty clause.
    pub fn build(self) -> WhereClause {
        if self.predicates.is_empty() {
            return WhereClause::default();
        }
        WhereClause {
            sql: format!(" WHERE {}", self.predicates.join(" AND ")),
            params: self.params,
        }
    }
}

fn like_pattern(v: &str) -> String {
    format!("%{}%", v)
}

/// Sortable columns for a customer's order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    OrderId,
    Status,
    NumOfItem,
    ShippedAt,
    DeliveredAt,
    ReturnedAt,
}

impl SortField {
    pub const ALLOWED: &'static [&'static str] = &[
        "created_at",
        "order_id",
        "status",
        "num_of_item",
        "shipped_at",
        "delivered_at",
        "returned_at",
    ];

    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::OrderId => "order_id",
            SortField::Status => "status",
            SortField::NumOfItem => "num_of_item",
            SortField::ShippedAt => "shipped_at",
            SortField::DeliveredAt => "delivered_at",
            SortField::ReturnedAt => "returned_at",
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "created_at" => SortField::CreatedAt,
            "order_id" => SortField::OrderId,
            "status" => SortField::Status,
            "num_of_item" => SortField::NumOfItem,
            "shipped_at" => SortField::ShippedAt,
            "delivered_at" => SortField::DeliveredAt,
            "returned_at" => SortField::ReturnedAt,
            other => {
                return Err(AppError::BadRequest(format!(
                    "Invalid sort_by '{}'. Allowed: {}",
                    other,
                    Self::ALLOWED.join(", ")
                )))
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(AppError::BadRequest(format!(
                "Invalid sort_order '{}'. Use ASC or DESC",
                s
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_yields_no_where() {
        let w = FilterBuilder::new()
            .eq("status", None::<String>)
            .contains("city", None)
            .build();
        assert_eq!(w.sql, "");
        assert!(w.params.is_empty());
    }

    #[test]
    fn predicates_join_with_and_in_param_order() {
        let w = FilterBuilder::new()
            .contains("city", Some("York"))
            .eq("gender", Some("F"))
            .contains_any(&["first_name", "email"], Some("ann"))
            .build();
        assert_eq!(
            w.sql,
            " WHERE city LIKE ? AND gender = ? AND (first_name LIKE ? OR email LIKE ?)"
        );
        assert_eq!(
            w.params,
            vec![
                BindValue::Text("%York%".into()),
                BindValue::Text("F".into()),
                BindValue::Text("%ann%".into()),
                BindValue::Text("%ann%".into()),
            ]
        );
    }

    #[test]
    fn user_input_never_reaches_sql_text() {
        let hostile = "x'; DROP TABLE users; --";
        let w = FilterBuilder::new()
            .contains("city", Some(hostile))
            .eq("user_id", Some(7i64))
            .build();
        assert!(!w.sql.contains("DROP"));
        assert_eq!(w.params[1], BindValue::Int(7));
    }

    #[test]
    fn sort_field_is_allow_listed() {
        assert_eq!("num_of_item".parse::<SortField>().unwrap(), SortField::NumOfItem);
        assert!("user_id; DROP TABLE orders".parse::<SortField>().is_err());
        assert!("email".parse::<SortField>().is_err());
    }

    #[test]
    fn sort_order_is_case_insensitive() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}

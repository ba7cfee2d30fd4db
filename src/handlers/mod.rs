//! HTTP handlers for customers, orders and statistics.

pub mod customers;
pub mod orders;
pub mod stats;
pub use customers::*;
pub use orders::*;
pub use stats::*;

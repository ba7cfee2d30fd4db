//! Row and response types. Each struct maps named columns to typed fields.

pub mod customer;
pub mod order;
pub mod page;
pub mod stats;

pub use customer::*;
pub use order::*;
pub use page::*;
pub use stats::*;

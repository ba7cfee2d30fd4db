//! Runtime settings: environment (with `.env`) first, CLI flags on top.

pub mod loader;
pub mod types;

pub use types::*;

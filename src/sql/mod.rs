//! Safe SQL assembly: identifiers from code only, values as parameters.

mod filter;
pub mod params;
pub use filter::*;
pub use params::*;

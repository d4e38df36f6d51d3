//! Data models
//!
//! Wire shapes of the catalog service resources. All IDs are `i64`
//! (server-side integer primary keys).

pub mod category;
pub mod product;
pub mod size;

// Re-exports
pub use category::*;
pub use product::*;
pub use size::*;

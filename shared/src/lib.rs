//! Shared types for the catalog console
//!
//! Wire models for the remote catalog service and the response envelope
//! every endpoint wraps its payload in.

pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    Category, CategoryPayload, NewSize, NewSizeLink, Product, ProductSizeLink, Size,
    SizeLinkUpdate, SizeUpdate,
};
pub use response::{ApiResponse, OneOrMany};

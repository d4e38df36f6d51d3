//! Catalog Client - admin-side client for the remote catalog service
//!
//! Holds the client-side snapshot of categories, sizes and products, and the
//! pieces of logic that sit between user input and the REST API:
//! display-order swaps, size availability, and debounced product search.

pub mod api;
pub mod availability;
pub mod config;
pub mod error;
pub mod http;
pub mod ordering;
pub mod panel;
pub mod search;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod fake;

pub use api::{CatalogApi, ImageUpload, NewProduct, ProductDraft};
pub use availability::available_sizes;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, Operation, StoreError, StoreResult};
pub use http::NetworkHttpClient;
pub use ordering::{EditPlan, OrderingError, SizeEdit};
pub use panel::{Dialog, PanelError, PanelState};
pub use search::{DebounceState, PendingSearch, SearchDebouncer, SearchOutcome, SearchQuery};
pub use session::{SessionEvent, SessionEvents};
pub use store::{CatalogSnapshot, CatalogStore, Collection, EditOutcome, LoadReport};

// Re-export shared types for convenience
pub use shared::{ApiResponse, Category, Product, ProductSizeLink, Size};

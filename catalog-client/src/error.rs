//! Client error types
//!
//! Two layers: [`ClientError`] is what the transport reports, [`StoreError`]
//! is what a store operation hands back to the console. The store decides
//! which message a user gets to see.

use std::fmt;

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Session is missing or no longer valid (HTTP 401)
    #[error("Authentication required")]
    Unauthorized,

    /// Server answered with `success: false` or a non-2xx status
    #[error("Request rejected ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Store operations, used to pick the generic message for a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadCategories,
    LoadSizes,
    LoadProducts,
    SearchProducts,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    CreateSize,
    UpdateSize,
    DeleteSize,
    CreateProduct,
    AttachSize,
    UpdateSizeLink,
    DetachSize,
}

impl Operation {
    /// Message shown when the server gave none, or the request never got an answer
    pub fn fallback_message(self) -> &'static str {
        match self {
            Operation::LoadCategories => "Failed to load categories",
            Operation::LoadSizes => "Failed to load sizes",
            Operation::LoadProducts => "Failed to load products",
            Operation::SearchProducts => "Failed to search products",
            Operation::CreateCategory => "Failed to create category",
            Operation::UpdateCategory => "Failed to update category",
            Operation::DeleteCategory => "Failed to delete category",
            Operation::CreateSize => "Failed to create size",
            Operation::UpdateSize => "Failed to update size",
            Operation::DeleteSize => "Failed to delete size",
            Operation::CreateProduct => "Failed to create product",
            Operation::AttachSize => "Failed to add size to product",
            Operation::UpdateSizeLink => "Failed to update product size",
            Operation::DetachSize => "Failed to remove size from product",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fallback_message())
    }
}

/// Store error type
#[derive(Debug, Error)]
pub enum StoreError {
    /// Precondition failed, nothing was sent
    #[error("{0}")]
    Validation(String),

    /// Server rejected the request
    #[error("{message}")]
    Server { operation: Operation, message: String },

    /// Network or decoding failure
    #[error("{operation}")]
    Transport {
        operation: Operation,
        #[source]
        source: ClientError,
    },

    /// Session is no longer valid; a re-authentication event was published
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// A display-order swap failed midway and could not be reverted
    #[error("Swapping the display order of sizes {edited} and {displaced} failed and could not be undone: {reason}")]
    PartialSwap {
        edited: i64,
        displaced: i64,
        reason: String,
    },
}

impl StoreError {
    /// Classify a transport error for `operation`
    pub fn from_client(operation: Operation, err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => StoreError::SessionExpired,
            ClientError::Rejected { message, .. } => StoreError::Server {
                operation,
                message: message.unwrap_or_else(|| operation.fallback_message().to_string()),
            },
            other => StoreError::Transport {
                operation,
                source: other,
            },
        }
    }

    /// Whether this error belongs in the normal error display.
    ///
    /// An expired session is handled by the re-authentication flow instead.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, StoreError::SessionExpired)
    }

    /// Text for the console
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

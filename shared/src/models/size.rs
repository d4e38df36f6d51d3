//! Size Model

use serde::{Deserialize, Serialize};

/// Size entity
///
/// `display_order` is unique across all sizes; the server assigns it on
/// creation and clients swap it on conflicting edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub id: i64,
    pub name: String,
    pub display_order: u32,
}

/// Create size payload (order is assigned by the server)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSize {
    pub name: String,
}

/// Update size payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<u32>,
}

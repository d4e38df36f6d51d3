//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity, with the sizes attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Opaque image reference (path or URL) owned by the server
    #[serde(default)]
    pub image: Option<String>,
    /// Category reference (required)
    pub category_id: i64,
    #[serde(default)]
    pub sizes: Vec<ProductSizeLink>,
}

impl Product {
    /// Whether a link for `size_id` is attached to this product
    pub fn has_size(&self, size_id: i64) -> bool {
        self.sizes.iter().any(|link| link.size_id == size_id)
    }

    pub fn size_link(&self, size_id: i64) -> Option<&ProductSizeLink> {
        self.sizes.iter().find(|link| link.size_id == size_id)
    }
}

/// Per-product attachment of a size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSizeLink {
    pub size_id: i64,
    /// Denormalized size name
    pub size_name: String,
    pub price: Decimal,
    pub stock: u32,
}

/// Attach size payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSizeLink {
    pub size_id: i64,
    pub price: Decimal,
    pub stock: u32,
}

/// Update size link payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeLinkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl SizeLinkUpdate {
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.stock.is_none()
    }
}

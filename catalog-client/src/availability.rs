//! Size availability per product

use shared::{Product, Size};

/// Sizes that are not yet attached to `product`, in input order.
///
/// An empty result means no size can be added; it is not an error.
pub fn available_sizes<'a>(all_sizes: &'a [Size], product: &Product) -> Vec<&'a Size> {
    all_sizes
        .iter()
        .filter(|size| !product.has_size(size.id))
        .collect()
}

//! Typed REST surface of the catalog service
//!
//! [`CatalogApi`] is the seam between the store and the network. The store
//! only ever talks to the service through it.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::IgnoredAny;
use shared::{
    Category, CategoryPayload, NewSize, NewSizeLink, OneOrMany, Product, Size, SizeLinkUpdate,
    SizeUpdate,
};

use crate::{ClientResult, NetworkHttpClient};

/// Product fields as typed into the create form
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: String,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

impl ProductDraft {
    /// Check the draft before anything is sent
    pub fn validate(&self) -> Result<NewProduct, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Product name is required".into());
        }
        let category_id = match self.category_id {
            Some(id) if id > 0 => id,
            _ => return Err("Please select a category".into()),
        };
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(NewProduct {
            name: name.to_string(),
            category_id,
            description,
        })
    }
}

/// Validated product creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub category_id: i64,
    pub description: Option<String>,
}

/// Image file attached to a product creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Catalog service operations
///
/// Mutations report only whether the server confirmed them; callers reload
/// the collections to see the result.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    // ========== Categories ==========
    async fn list_categories(&self) -> ClientResult<Vec<Category>>;
    async fn create_category(&self, payload: &CategoryPayload) -> ClientResult<()>;
    async fn update_category(&self, id: i64, payload: &CategoryPayload) -> ClientResult<()>;
    async fn delete_category(&self, id: i64) -> ClientResult<()>;

    // ========== Sizes ==========
    async fn list_sizes(&self) -> ClientResult<Vec<Size>>;
    async fn create_size(&self, payload: &NewSize) -> ClientResult<()>;
    async fn update_size(&self, id: i64, payload: &SizeUpdate) -> ClientResult<()>;
    async fn delete_size(&self, id: i64) -> ClientResult<()>;

    // ========== Products ==========
    async fn list_products(&self) -> ClientResult<Vec<Product>>;
    async fn search_products(&self, term: &str) -> ClientResult<Vec<Product>>;
    async fn create_product(
        &self,
        product: &NewProduct,
        image: Option<&ImageUpload>,
    ) -> ClientResult<()>;

    // ========== Product sizes ==========
    async fn attach_size(&self, product_id: i64, link: &NewSizeLink) -> ClientResult<()>;
    async fn update_size_link(
        &self,
        product_id: i64,
        size_id: i64,
        update: &SizeLinkUpdate,
    ) -> ClientResult<()>;
    async fn detach_size(&self, product_id: i64, size_id: i64) -> ClientResult<()>;
}

fn list<T>(data: Option<OneOrMany<T>>) -> Vec<T> {
    data.map(OneOrMany::into_vec).unwrap_or_default()
}

#[async_trait]
impl CatalogApi for NetworkHttpClient {
    async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        Ok(list(self.get("/categories").await?.data))
    }

    async fn create_category(&self, payload: &CategoryPayload) -> ClientResult<()> {
        self.post::<IgnoredAny, _>("/categories", payload).await?;
        Ok(())
    }

    async fn update_category(&self, id: i64, payload: &CategoryPayload) -> ClientResult<()> {
        self.put::<IgnoredAny, _>(&format!("/categories/{id}"), payload)
            .await?;
        Ok(())
    }

    async fn delete_category(&self, id: i64) -> ClientResult<()> {
        self.delete::<IgnoredAny>(&format!("/categories/{id}")).await?;
        Ok(())
    }

    async fn list_sizes(&self) -> ClientResult<Vec<Size>> {
        Ok(list(self.get("/sizes").await?.data))
    }

    async fn create_size(&self, payload: &NewSize) -> ClientResult<()> {
        self.post::<IgnoredAny, _>("/sizes", payload).await?;
        Ok(())
    }

    async fn update_size(&self, id: i64, payload: &SizeUpdate) -> ClientResult<()> {
        self.put::<IgnoredAny, _>(&format!("/sizes/{id}"), payload).await?;
        Ok(())
    }

    async fn delete_size(&self, id: i64) -> ClientResult<()> {
        self.delete::<IgnoredAny>(&format!("/sizes/{id}")).await?;
        Ok(())
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        Ok(list(self.get("/products").await?.data))
    }

    async fn search_products(&self, term: &str) -> ClientResult<Vec<Product>> {
        let resp = self
            .get_with_query("/products/search", &[("search_query", term)])
            .await?;
        Ok(list(resp.data))
    }

    async fn create_product(
        &self,
        product: &NewProduct,
        image: Option<&ImageUpload>,
    ) -> ClientResult<()> {
        let mut form = Form::new()
            .text("name", product.name.clone())
            .text("category_id", product.category_id.to_string());
        if let Some(description) = &product.description {
            form = form.text("description", description.clone());
        }
        if let Some(image) = image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)?;
            form = form.part("image", part);
        }

        self.post_multipart::<IgnoredAny>("/products", form).await?;
        Ok(())
    }

    async fn attach_size(&self, product_id: i64, link: &NewSizeLink) -> ClientResult<()> {
        self.post::<IgnoredAny, _>(&format!("/products/{product_id}/sizes"), link)
            .await?;
        Ok(())
    }

    async fn update_size_link(
        &self,
        product_id: i64,
        size_id: i64,
        update: &SizeLinkUpdate,
    ) -> ClientResult<()> {
        self.put::<IgnoredAny, _>(&format!("/products/{product_id}/sizes/{size_id}"), update)
            .await?;
        Ok(())
    }

    async fn detach_size(&self, product_id: i64, size_id: i64) -> ClientResult<()> {
        self.delete::<IgnoredAny>(&format!("/products/{product_id}/sizes/{size_id}"))
            .await?;
        Ok(())
    }
}

//! Console panel state
//!
//! Which dialog is open, what its form holds, and which product row is
//! expanded. Transitions are methods so the rules (for instance "no attach
//! dialog when every size is already attached") live here and not in
//! whatever renders the panel. [`PanelState::submit`] sends the open form
//! through the store.

use rust_decimal::Decimal;
use shared::{Category, Size, SizeLinkUpdate};
use thiserror::Error;

use crate::store::{CatalogSnapshot, CatalogStore, EditOutcome};
use crate::{CatalogApi, ImageUpload, ProductDraft, SizeEdit, StoreError, StoreResult};

/// Open dialog and its form buffer
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    CreateCategory {
        name: String,
    },
    EditCategory {
        id: i64,
        name: String,
    },
    CreateSize {
        name: String,
    },
    EditSize {
        id: i64,
        name: String,
        display_order: u32,
    },
    CreateProduct {
        name: String,
        category_id: Option<i64>,
        description: String,
        image: Option<ImageUpload>,
    },
    AttachSize {
        product_id: i64,
        /// Sizes offered, from the availability filter
        choices: Vec<i64>,
        size_id: i64,
        price: Decimal,
        stock: u32,
    },
    EditSizeLink {
        product_id: i64,
        size_id: i64,
        price: Decimal,
        stock: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("Every size is already added to this product")]
    NoSizeAvailable,

    #[error("Product {0} not found")]
    UnknownProduct(i64),

    #[error("Size {size_id} is not attached to product {product_id}")]
    UnknownLink { product_id: i64, size_id: i64 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    dialog: Option<Dialog>,
    expanded_product: Option<i64>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut Dialog> {
        self.dialog.as_mut()
    }

    pub fn expanded_product(&self) -> Option<i64> {
        self.expanded_product
    }

    pub fn open_create_category(&mut self) {
        self.dialog = Some(Dialog::CreateCategory {
            name: String::new(),
        });
    }

    pub fn open_edit_category(&mut self, category: &Category) {
        self.dialog = Some(Dialog::EditCategory {
            id: category.id,
            name: category.name.clone(),
        });
    }

    pub fn open_create_size(&mut self) {
        self.dialog = Some(Dialog::CreateSize {
            name: String::new(),
        });
    }

    pub fn open_edit_size(&mut self, size: &Size) {
        self.dialog = Some(Dialog::EditSize {
            id: size.id,
            name: size.name.clone(),
            display_order: size.display_order,
        });
    }

    /// Product form, preselecting the first category
    pub fn open_create_product(&mut self, snapshot: &CatalogSnapshot) {
        self.dialog = Some(Dialog::CreateProduct {
            name: String::new(),
            category_id: snapshot.categories().first().map(|c| c.id),
            description: String::new(),
            image: None,
        });
    }

    /// Attach dialog offering the sizes not yet on the product
    pub fn open_attach_size(
        &mut self,
        snapshot: &CatalogSnapshot,
        product_id: i64,
    ) -> Result<(), PanelError> {
        let choices: Vec<i64> = snapshot
            .available_sizes(product_id)
            .ok_or(PanelError::UnknownProduct(product_id))?
            .iter()
            .map(|s| s.id)
            .collect();
        let Some(&first) = choices.first() else {
            return Err(PanelError::NoSizeAvailable);
        };

        self.dialog = Some(Dialog::AttachSize {
            product_id,
            choices,
            size_id: first,
            price: Decimal::ZERO,
            stock: 0,
        });
        Ok(())
    }

    pub fn open_edit_size_link(
        &mut self,
        snapshot: &CatalogSnapshot,
        product_id: i64,
        size_id: i64,
    ) -> Result<(), PanelError> {
        let link = snapshot
            .product(product_id)
            .ok_or(PanelError::UnknownProduct(product_id))?
            .size_link(size_id)
            .ok_or(PanelError::UnknownLink {
                product_id,
                size_id,
            })?;

        self.dialog = Some(Dialog::EditSizeLink {
            product_id,
            size_id,
            price: link.price,
            stock: link.stock,
        });
        Ok(())
    }

    /// Close the dialog, dropping its form buffer
    pub fn close(&mut self) -> Option<Dialog> {
        self.dialog.take()
    }

    /// Expand a product row, or collapse it if it is the expanded one
    pub fn toggle_product(&mut self, product_id: i64) {
        self.expanded_product = match self.expanded_product {
            Some(id) if id == product_id => None,
            _ => Some(product_id),
        };
    }

    /// Send the open form to the store.
    ///
    /// The dialog closes once the server confirmed the change. On any error it
    /// stays open with its buffer so the form can be corrected and sent again.
    pub async fn submit<A: CatalogApi>(
        &mut self,
        store: &mut CatalogStore<A>,
    ) -> StoreResult<EditOutcome> {
        let Some(dialog) = &self.dialog else {
            return Err(StoreError::Validation("Nothing to submit".into()));
        };

        let outcome = match dialog {
            Dialog::CreateCategory { name } => {
                EditOutcome::Updated(store.create_category(name).await?)
            }
            Dialog::EditCategory { id, name } => {
                EditOutcome::Updated(store.update_category(*id, name).await?)
            }
            Dialog::CreateSize { name } => EditOutcome::Updated(store.create_size(name).await?),
            Dialog::EditSize {
                id,
                name,
                display_order,
            } => {
                let edit = SizeEdit {
                    name: Some(name.clone()),
                    display_order: Some(*display_order),
                };
                store.edit_size(*id, &edit).await?
            }
            Dialog::CreateProduct {
                name,
                category_id,
                description,
                image,
            } => {
                let draft = ProductDraft {
                    name: name.clone(),
                    category_id: *category_id,
                    description: Some(description.clone()),
                };
                EditOutcome::Updated(store.create_product(&draft, image.as_ref()).await?)
            }
            Dialog::AttachSize {
                product_id,
                choices,
                size_id,
                price,
                stock,
            } => {
                if !choices.contains(size_id) {
                    return Err(StoreError::Validation(
                        "Please select one of the available sizes".into(),
                    ));
                }
                EditOutcome::Updated(
                    store
                        .attach_size(*product_id, *size_id, *price, *stock)
                        .await?,
                )
            }
            Dialog::EditSizeLink {
                product_id,
                size_id,
                price,
                stock,
            } => {
                let update = SizeLinkUpdate {
                    price: Some(*price),
                    stock: Some(*stock),
                };
                EditOutcome::Updated(
                    store
                        .update_size_link(*product_id, *size_id, &update)
                        .await?,
                )
            }
        };

        self.dialog = None;
        Ok(outcome)
    }
}

//! Catalog Store - client-side snapshot of the catalog
//!
//! The store never applies a change optimistically. Every mutation is sent,
//! and only a confirmed one triggers a full reload; a failed one leaves the
//! snapshot as it was and hands back an error.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{
    Category, CategoryPayload, NewSize, NewSizeLink, Product, Size, SizeLinkUpdate,
};
use tokio::sync::broadcast;

use crate::availability::available_sizes;
use crate::ordering::{self, EditPlan, SizeEdit, SwapStep};
use crate::search::{self, PendingSearch, SearchOutcome, SearchQuery, SearchSequencer};
use crate::{
    CatalogApi, ClientError, ClientResult, ImageUpload, Operation, ProductDraft, SessionEvent,
    SessionEvents, StoreError, StoreResult,
};

const UNKNOWN_CATEGORY: &str = "Unknown";

// ============================================================================
// Snapshot
// ============================================================================

/// Last confirmed server state
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    categories: Vec<Category>,
    sizes: Vec<Size>,
    products: Vec<Product>,
}

impl CatalogSnapshot {
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn sizes(&self) -> &[Size] {
        &self.sizes
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn size(&self, id: i64) -> Option<&Size> {
        self.sizes.iter().find(|s| s.id == id)
    }

    pub fn product(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Category name for display; dangling ids show as "Unknown"
    pub fn category_name(&self, id: i64) -> &str {
        self.category(id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    /// Sizes in presentation order
    pub fn sizes_by_display_order(&self) -> Vec<&Size> {
        let mut sizes: Vec<&Size> = self.sizes.iter().collect();
        sizes.sort_by_key(|s| (s.display_order, s.id));
        sizes
    }

    /// Sizes that can still be attached to `product_id`, `None` if the product is unknown
    pub fn available_sizes(&self, product_id: i64) -> Option<Vec<&Size>> {
        self.product(product_id)
            .map(|product| available_sizes(&self.sizes, product))
    }
}

/// The three collections a load refreshes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Categories,
    Sizes,
    Products,
}

/// Outcome of a [`CatalogStore::load`]
///
/// Collections not listed in `failures` were refreshed.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub failures: Vec<(Collection, StoreError)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, collection: Collection) -> bool {
        self.failures.iter().any(|(c, _)| *c == collection)
    }
}

/// Result of a size edit or a submitted panel form
#[derive(Debug)]
pub enum EditOutcome {
    /// Nothing to change, no request was sent
    Unchanged,
    Updated(LoadReport),
    /// Target order was taken; `displaced` got the edited size's old order
    Swapped { displaced: i64, report: LoadReport },
}

impl EditOutcome {
    /// Reload that followed the change, empty when nothing was sent
    pub fn into_report(self) -> LoadReport {
        match self {
            EditOutcome::Unchanged => LoadReport::default(),
            EditOutcome::Updated(report) | EditOutcome::Swapped { report, .. } => report,
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// Catalog store
pub struct CatalogStore<A> {
    api: Arc<A>,
    snapshot: CatalogSnapshot,
    session: SessionEvents,
    products_seq: SearchSequencer,
}

impl<A: CatalogApi> CatalogStore<A> {
    pub fn new(api: A) -> Self {
        Self::with_session(Arc::new(api), SessionEvents::new())
    }

    /// Store publishing 401s on an existing session channel
    pub fn with_session(api: Arc<A>, session: SessionEvents) -> Self {
        Self {
            api,
            snapshot: CatalogSnapshot::default(),
            session,
            products_seq: SearchSequencer::default(),
        }
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    /// Shared handle to the API, for requests issued outside the store
    pub fn api(&self) -> Arc<A> {
        Arc::clone(&self.api)
    }

    pub fn subscribe_session(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    fn reject(&self, operation: Operation, err: ClientError) -> StoreError {
        let err = StoreError::from_client(operation, err);
        match &err {
            StoreError::SessionExpired => self.session.require_reauthentication(),
            StoreError::Transport { source, .. } => {
                tracing::error!(%operation, error = %source, "catalog request failed")
            }
            other => tracing::warn!(%operation, error = %other, "catalog request rejected"),
        }
        err
    }

    /// Reload after a confirmed mutation, or surface the rejection
    async fn confirm(&mut self, operation: Operation, result: ClientResult<()>) -> StoreResult<LoadReport> {
        match result {
            Ok(()) => {
                tracing::info!(%operation, "catalog mutation confirmed");
                Ok(self.load().await)
            }
            Err(e) => Err(self.reject(operation, e)),
        }
    }

    // ========== Load ==========

    /// Fetch categories, sizes and products concurrently.
    ///
    /// Each collection is applied on its own; a failed fetch keeps that
    /// collection's previous contents and is listed in the report.
    pub async fn load(&mut self) -> LoadReport {
        // a full reload supersedes any product search still in flight
        self.products_seq.issue();
        let api = &*self.api;
        let (categories, sizes, products) =
            tokio::join!(api.list_categories(), api.list_sizes(), api.list_products());

        let mut report = LoadReport::default();
        let mut session_expired = false;
        let mut settle = |collection: Collection, operation: Operation, err: ClientError| {
            let err = StoreError::from_client(operation, err);
            if matches!(err, StoreError::SessionExpired) {
                session_expired = true;
            } else {
                tracing::warn!(?collection, error = %err, "partial catalog load");
            }
            report.failures.push((collection, err));
        };

        match categories {
            Ok(categories) => self.snapshot.categories = categories,
            Err(e) => settle(Collection::Categories, Operation::LoadCategories, e),
        }
        match sizes {
            Ok(sizes) => self.snapshot.sizes = sizes,
            Err(e) => settle(Collection::Sizes, Operation::LoadSizes, e),
        }
        match products {
            Ok(products) => self.snapshot.products = products,
            Err(e) => settle(Collection::Products, Operation::LoadProducts, e),
        }

        if session_expired {
            self.session.require_reauthentication();
        }
        tracing::debug!(
            categories = self.snapshot.categories.len(),
            sizes = self.snapshot.sizes.len(),
            products = self.snapshot.products.len(),
            failures = report.failures.len(),
            "catalog loaded"
        );
        report
    }

    // ========== Categories ==========

    pub async fn create_category(&mut self, name: &str) -> StoreResult<LoadReport> {
        let payload = category_payload(name)?;
        let result = self.api.create_category(&payload).await;
        self.confirm(Operation::CreateCategory, result).await
    }

    pub async fn update_category(&mut self, id: i64, name: &str) -> StoreResult<LoadReport> {
        let payload = category_payload(name)?;
        let result = self.api.update_category(id, &payload).await;
        self.confirm(Operation::UpdateCategory, result).await
    }

    pub async fn delete_category(&mut self, id: i64) -> StoreResult<LoadReport> {
        let result = self.api.delete_category(id).await;
        self.confirm(Operation::DeleteCategory, result).await
    }

    // ========== Sizes ==========

    pub async fn create_size(&mut self, name: &str) -> StoreResult<LoadReport> {
        let name = required(name, "Size name is required")?;
        let result = self.api.create_size(&NewSize { name }).await;
        self.confirm(Operation::CreateSize, result).await
    }

    /// Rename and/or reorder a size.
    ///
    /// Moving onto an order another size holds swaps the two. The swap is one
    /// logical change sent as several updates. When one of them is rejected,
    /// the ones already committed are reverted and the original error is
    /// returned, so the swap happened entirely or not at all. Only if a revert
    /// is rejected too is the result a [`StoreError::PartialSwap`], with the
    /// snapshot reloaded to show what the server actually kept.
    pub async fn edit_size(&mut self, size_id: i64, edit: &SizeEdit) -> StoreResult<EditOutcome> {
        let plan = ordering::plan_edit(&self.snapshot.sizes, size_id, edit)
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        match plan {
            EditPlan::Unchanged => Ok(EditOutcome::Unchanged),
            EditPlan::Direct(edited) => {
                let result = self.api.update_size(edited.size_id, &edited.update).await;
                let report = self.confirm(Operation::UpdateSize, result).await?;
                Ok(EditOutcome::Updated(report))
            }
            EditPlan::Swap {
                edited,
                displaced,
                steps,
            } => {
                tracing::info!(
                    size_id = edited.size_id,
                    displaced = displaced.size_id,
                    "swapping size display orders"
                );
                for (sent, step) in steps.iter().enumerate() {
                    let forward = &step.forward;
                    if let Err(e) = self.api.update_size(forward.size_id, &forward.update).await {
                        let err = self.reject(Operation::UpdateSize, e);
                        if matches!(err, StoreError::SessionExpired) {
                            return Err(err);
                        }
                        let pair = (edited.size_id, displaced.size_id);
                        return Err(self.revert_swap(&steps[..sent], pair, err).await);
                    }
                }

                let report = self.confirm(Operation::UpdateSize, Ok(())).await?;
                Ok(EditOutcome::Swapped {
                    displaced: displaced.size_id,
                    report,
                })
            }
        }
    }

    /// Undo the committed steps of a failed swap, newest first.
    ///
    /// Hands back `cause` when everything was reverted.
    async fn revert_swap(
        &mut self,
        committed: &[SwapStep],
        (edited, displaced): (i64, i64),
        cause: StoreError,
    ) -> StoreError {
        for step in committed.iter().rev() {
            let revert = &step.revert;
            if let Err(e) = self.api.update_size(revert.size_id, &revert.update).await {
                let err = self.reject(Operation::UpdateSize, e);
                if matches!(err, StoreError::SessionExpired) {
                    return err;
                }
                tracing::warn!(edited, displaced, error = %err, "display order swap left half applied");
                self.load().await;
                return StoreError::PartialSwap {
                    edited,
                    displaced,
                    reason: cause.user_message(),
                };
            }
        }
        if !committed.is_empty() {
            tracing::info!(edited, displaced, "display order swap reverted");
        }
        cause
    }

    pub async fn delete_size(&mut self, id: i64) -> StoreResult<LoadReport> {
        let result = self.api.delete_size(id).await;
        self.confirm(Operation::DeleteSize, result).await
    }

    // ========== Products ==========

    /// Create a product from the form draft, with an optional image file.
    ///
    /// A draft without a category is refused before anything is sent.
    pub async fn create_product(
        &mut self,
        draft: &ProductDraft,
        image: Option<&ImageUpload>,
    ) -> StoreResult<LoadReport> {
        let product = draft.validate().map_err(StoreError::Validation)?;
        let result = self.api.create_product(&product, image).await;
        self.confirm(Operation::CreateProduct, result).await
    }

    // ========== Product sizes ==========

    pub async fn attach_size(
        &mut self,
        product_id: i64,
        size_id: i64,
        price: Decimal,
        stock: u32,
    ) -> StoreResult<LoadReport> {
        non_negative(price)?;
        if self
            .snapshot
            .product(product_id)
            .is_some_and(|p| p.has_size(size_id))
        {
            return Err(StoreError::Validation(
                "This size is already added to the product".into(),
            ));
        }

        let link = NewSizeLink {
            size_id,
            price,
            stock,
        };
        let result = self.api.attach_size(product_id, &link).await;
        self.confirm(Operation::AttachSize, result).await
    }

    pub async fn update_size_link(
        &mut self,
        product_id: i64,
        size_id: i64,
        update: &SizeLinkUpdate,
    ) -> StoreResult<LoadReport> {
        if update.is_empty() {
            return Err(StoreError::Validation("Nothing to update".into()));
        }
        if let Some(price) = update.price {
            non_negative(price)?;
        }

        let result = self.api.update_size_link(product_id, size_id, update).await;
        self.confirm(Operation::UpdateSizeLink, result).await
    }

    pub async fn detach_size(&mut self, product_id: i64, size_id: i64) -> StoreResult<LoadReport> {
        let result = self.api.detach_size(product_id, size_id).await;
        self.confirm(Operation::DetachSize, result).await
    }

    // ========== Search ==========

    /// Issue a product request. The returned ticket supersedes every earlier one.
    pub fn issue_search(&mut self, query: SearchQuery) -> PendingSearch {
        PendingSearch {
            ticket: self.products_seq.issue(),
            query,
        }
    }

    /// Apply the response to an issued product request.
    ///
    /// Responses to anything but the most recently issued request are
    /// dropped, errors included.
    pub fn apply_search(
        &mut self,
        pending: &PendingSearch,
        result: ClientResult<Vec<Product>>,
    ) -> StoreResult<SearchOutcome> {
        if !self.products_seq.is_latest(pending.ticket) {
            tracing::debug!(query = ?pending.query, "dropping stale product response");
            return Ok(SearchOutcome::Stale);
        }

        match result {
            Ok(products) => {
                let count = products.len();
                self.snapshot.products = products;
                Ok(SearchOutcome::Applied { count })
            }
            Err(e) => Err(self.reject(pending.query.operation(), e)),
        }
    }

    /// Issue, await and apply a product request in one go
    pub async fn search_products(&mut self, query: SearchQuery) -> StoreResult<SearchOutcome> {
        let pending = self.issue_search(query);
        let result = search::fetch_products(&*self.api, &pending.query).await;
        self.apply_search(&pending, result)
    }
}

fn required(value: &str, message: &str) -> StoreResult<String> {
    match value.trim() {
        "" => Err(StoreError::Validation(message.to_string())),
        value => Ok(value.to_string()),
    }
}

fn category_payload(name: &str) -> StoreResult<CategoryPayload> {
    Ok(CategoryPayload {
        name: required(name, "Category name is required")?,
    })
}

fn non_negative(price: Decimal) -> StoreResult<()> {
    if price < Decimal::ZERO {
        return Err(StoreError::Validation("Price cannot be negative".into()));
    }
    Ok(())
}

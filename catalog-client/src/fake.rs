//! In-memory catalog service for store tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{
    Category, CategoryPayload, NewSize, NewSizeLink, Product, ProductSizeLink, Size,
    SizeLinkUpdate, SizeUpdate,
};

use crate::{CatalogApi, ClientError, ClientResult, ImageUpload, NewProduct};

#[derive(Debug, Clone)]
pub enum Fault {
    Server(Option<String>),
    Transport,
    Unauthorized,
}

impl Fault {
    fn into_error(self) -> ClientError {
        match self {
            Fault::Server(message) => ClientError::Rejected {
                status: 500,
                message,
            },
            Fault::Transport => ClientError::InvalidResponse("connection reset".into()),
            Fault::Unauthorized => ClientError::Unauthorized,
        }
    }
}

struct FaultPlan {
    /// calls let through before the fault applies
    skip: usize,
    /// failures left, `None` for every following call
    remaining: Option<usize>,
    fault: Fault,
}

#[derive(Default)]
struct State {
    categories: Vec<Category>,
    sizes: Vec<Size>,
    products: Vec<Product>,
    next_id: i64,
    faults: HashMap<&'static str, FaultPlan>,
    calls: HashMap<&'static str, usize>,
}

impl State {
    fn enter(&mut self, method: &'static str) -> ClientResult<()> {
        *self.calls.entry(method).or_default() += 1;
        let Some(plan) = self.faults.get_mut(method) else {
            return Ok(());
        };
        if plan.skip > 0 {
            plan.skip -= 1;
            return Ok(());
        }
        match &mut plan.remaining {
            Some(0) => Ok(()),
            Some(left) => {
                *left -= 1;
                Err(plan.fault.clone().into_error())
            }
            None => Err(plan.fault.clone().into_error()),
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn product_mut(&mut self, id: i64) -> ClientResult<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("Product"))
    }
}

fn not_found(what: &str) -> ClientError {
    ClientError::Rejected {
        status: 404,
        message: Some(format!("{what} not found")),
    }
}

#[derive(Clone, Default)]
pub struct FakeCatalog {
    state: Arc<Mutex<State>>,
}

impl FakeCatalog {
    /// Coffee/Tea categories, Small/Medium/Large sizes, Latte and Mocha
    pub fn seeded() -> Self {
        let link = |size_id: i64, size_name: &str, cents: i64, stock: u32| ProductSizeLink {
            size_id,
            size_name: size_name.into(),
            price: Decimal::new(cents, 2),
            stock,
        };
        let state = State {
            categories: vec![
                Category {
                    id: 1,
                    name: "Coffee".into(),
                },
                Category {
                    id: 2,
                    name: "Tea".into(),
                },
            ],
            sizes: vec![
                Size {
                    id: 1,
                    name: "Small".into(),
                    display_order: 1,
                },
                Size {
                    id: 2,
                    name: "Medium".into(),
                    display_order: 2,
                },
                Size {
                    id: 3,
                    name: "Large".into(),
                    display_order: 3,
                },
            ],
            products: vec![
                Product {
                    id: 100,
                    name: "Latte".into(),
                    description: None,
                    image: None,
                    category_id: 1,
                    sizes: vec![link(1, "Small", 300, 10)],
                },
                Product {
                    id: 101,
                    name: "Mocha".into(),
                    description: Some("With cocoa".into()),
                    image: None,
                    category_id: 1,
                    sizes: vec![link(1, "Small", 350, 4), link(3, "Large", 450, 2)],
                },
            ],
            next_id: 200,
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Every following call to `method` fails with `fault`
    pub fn fail(&self, method: &'static str, fault: Fault) {
        self.fail_after(method, 0, fault);
    }

    /// Let `successes` calls to `method` through, then fail with `fault`
    pub fn fail_after(&self, method: &'static str, successes: usize, fault: Fault) {
        self.inject(method, successes, None, fault);
    }

    /// Let `successes` calls to `method` through, fail the next one only
    pub fn fail_once_after(&self, method: &'static str, successes: usize, fault: Fault) {
        self.inject(method, successes, Some(1), fault);
    }

    fn inject(&self, method: &'static str, skip: usize, remaining: Option<usize>, fault: Fault) {
        let plan = FaultPlan {
            skip,
            remaining,
            fault,
        };
        self.lock().faults.insert(method, plan);
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.lock().calls.get(method).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        let mut state = self.lock();
        state.enter("list_categories")?;
        Ok(state.categories.clone())
    }

    async fn create_category(&self, payload: &CategoryPayload) -> ClientResult<()> {
        let mut state = self.lock();
        state.enter("create_category")?;
        let id = state.next_id();
        state.categories.push(Category {
            id,
            name: payload.name.clone(),
        });
        Ok(())
    }

    async fn update_category(&self, id: i64, payload: &CategoryPayload) -> ClientResult<()> {
        let mut state = self.lock();
        state.enter("update_category")?;
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Category"))?;
        category.name = payload.name.clone();
        Ok(())
    }

    async fn delete_category(&self, id: i64) -> ClientResult<()> {
        let mut state = self.lock();
        state.enter("delete_category")?;
        state.categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn list_sizes(&self) -> ClientResult<Vec<Size>> {
        let mut state = self.lock();
        state.enter("list_sizes")?;
        Ok(state.sizes.clone())
    }

    async fn create_size(&self, payload: &NewSize) -> ClientResult<()> {
        let mut state = self.lock();
        state.enter("create_size")?;
        let id = state.next_id();
        let display_order = state.sizes.iter().map(|s| s.display_order).max().unwrap_or(0) + 1;
        state.sizes.push(Size {
            id,
            name: payload.name.clone(),
            display_order,
        });
        Ok(())
    }

    async fn update_size(&self, id: i64, payload: &SizeUpdate) -> ClientResult<()> {
        let mut state = self.lock();
        state.enter("update_size")?;
        if let Some(order) = payload.display_order
            && state
                .sizes
                .iter()
                .any(|s| s.id != id && s.display_order == order)
        {
            return Err(ClientError::Rejected {
                status: 409,
                message: Some("Display order already in use".into()),
            });
        }
        let size = state
            .sizes
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Size"))?;
        if let Some(name) = &payload.name {
            size.name = name.clone();
        }
        if let Some(order) = payload.display_order {
            size.display_order = order;
        }
        Ok(())
    }

    async fn delete_size(&self, id: i64) -> ClientResult<()> {
        let mut state = self.lock();
        state.enter("delete_size")?;
        state.sizes.retain(|s| s.id != id);
        Ok(())
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let mut state = self.lock();
        state.enter("list_products")?;
        Ok(state.products.clone())
    }

    async fn search_products(&self, term: &str) -> ClientResult<Vec<Product>> {
        let mut state = self.lock();
        state.enter("search_products")?;
        let term = term.to_lowercase();
        Ok(state
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&term))
            .cloned()
            .collect())
    }

    async fn create_product(
        &self,
        product: &NewProduct,
        image: Option<&ImageUpload>,
    ) -> ClientResult<()> {
        let mut state = self.lock();
        state.enter("create_product")?;
        let id = state.next_id();
        state.products.push(Product {
            id,
            name: product.name.clone(),
            description: product.description.clone(),
            image: image.map(|i| i.file_name.clone()),
            category_id: product.category_id,
            sizes: Vec::new(),
        });
        Ok(())
    }

    async fn attach_size(&self, product_id: i64, link: &NewSizeLink) -> ClientResult<()> {
        let mut state = self.lock();
        state.enter("attach_size")?;
        let size_name = state
            .sizes
            .iter()
            .find(|s| s.id == link.size_id)
            .map(|s| s.name.clone())
            .ok_or_else(|| not_found("Size"))?;
        state.product_mut(product_id)?.sizes.push(ProductSizeLink {
            size_id: link.size_id,
            size_name,
            price: link.price,
            stock: link.stock,
        });
        Ok(())
    }

    async fn update_size_link(
        &self,
        product_id: i64,
        size_id: i64,
        update: &SizeLinkUpdate,
    ) -> ClientResult<()> {
        let mut state = self.lock();
        state.enter("update_size_link")?;
        let link = state
            .product_mut(product_id)?
            .sizes
            .iter_mut()
            .find(|l| l.size_id == size_id)
            .ok_or_else(|| not_found("Product size"))?;
        if let Some(price) = update.price {
            link.price = price;
        }
        if let Some(stock) = update.stock {
            link.stock = stock;
        }
        Ok(())
    }

    async fn detach_size(&self, product_id: i64, size_id: i64) -> ClientResult<()> {
        let mut state = self.lock();
        state.enter("detach_size")?;
        state
            .product_mut(product_id)?
            .sizes
            .retain(|l| l.size_id != size_id);
        Ok(())
    }
}

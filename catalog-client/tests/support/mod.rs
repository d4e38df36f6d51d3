// catalog-client/tests/support/mod.rs
// In-memory catalog backend serving the REST surface over real HTTP

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use catalog_client::{ClientConfig, NetworkHttpClient};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    ApiResponse, Category, CategoryPayload, NewSize, NewSizeLink, Product, ProductSizeLink, Size,
    SizeLinkUpdate, SizeUpdate,
};

pub const SESSION_COOKIE: &str = "session=valid-session";

/// Multipart upload as received by the backend
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub len: usize,
}

#[derive(Default)]
pub struct Backend {
    pub categories: Vec<Category>,
    pub sizes: Vec<Size>,
    pub products: Vec<Product>,
    pub next_id: i64,
    pub session_revoked: bool,
    pub break_size_listing: bool,
    pub reject_size_updates_for: Option<i64>,
    /// Size updates accepted before every further one is rejected
    pub size_update_budget: Option<usize>,
    pub uploads: Vec<Upload>,
    pub searches: Vec<String>,
    pub requests: usize,
}

impl Backend {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<Backend>>;

fn lock(state: &Shared) -> MutexGuard<'_, Backend> {
    state.lock().unwrap()
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn ok<T>(data: T) -> Reply<T> {
    (StatusCode::OK, Json(ApiResponse::ok(data)))
}

fn created<T>(data: T) -> Reply<T> {
    (StatusCode::CREATED, Json(ApiResponse::ok(data)))
}

fn fail<T>(status: StatusCode, message: &str) -> Reply<T> {
    (status, Json(ApiResponse::error(message)))
}

pub struct MockCatalog {
    pub base_url: String,
    state: Shared,
}

impl MockCatalog {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(seed()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Client carrying the valid session cookie
    pub fn client(&self) -> NetworkHttpClient {
        ClientConfig::new(&self.base_url)
            .with_timeout(5)
            .with_session_cookie(SESSION_COOKIE)
            .build_http_client()
            .unwrap()
    }

    /// Client without any session
    pub fn anonymous_client(&self) -> NetworkHttpClient {
        ClientConfig::new(&self.base_url)
            .with_timeout(5)
            .build_http_client()
            .unwrap()
    }

    pub fn backend(&self) -> MutexGuard<'_, Backend> {
        lock(&self.state)
    }
}

fn seed() -> Backend {
    Backend {
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
            Size {
                id: 4,
                name: "Extra Large".into(),
                display_order: 4,
            },
        ],
        products: vec![
            Product {
                id: 10,
                name: "Latte".into(),
                description: Some("Milky".into()),
                image: None,
                category_id: 1,
                sizes: vec![
                    ProductSizeLink {
                        size_id: 1,
                        size_name: "Small".into(),
                        price: Decimal::new(300, 2),
                        stock: 10,
                    },
                    ProductSizeLink {
                        size_id: 3,
                        size_name: "Large".into(),
                        price: Decimal::new(450, 2),
                        stock: 6,
                    },
                ],
            },
            Product {
                id: 11,
                name: "Green Tea".into(),
                description: None,
                image: None,
                category_id: 2,
                sizes: Vec::new(),
            },
        ],
        next_id: 100,
        ..Backend::default()
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", put(update_category).delete(delete_category))
        .route("/sizes", get(list_sizes).post(create_size))
        .route("/sizes/{id}", put(update_size).delete(delete_size))
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route("/products/{id}/sizes", post(attach_size))
        .route(
            "/products/{id}/sizes/{size_id}",
            put(update_size_link).delete(detach_size),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .with_state(state)
}

async fn require_session(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let has_cookie = request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(';').any(|c| c.trim() == SESSION_COOKIE));
    let revoked = {
        let mut backend = lock(&state);
        backend.requests += 1;
        backend.session_revoked
    };

    if !has_cookie || revoked {
        return fail::<()>(StatusCode::UNAUTHORIZED, "Not authenticated").into_response();
    }
    next.run(request).await
}

// ========== Categories ==========

async fn list_categories(State(state): State<Shared>) -> Reply<Vec<Category>> {
    ok(lock(&state).categories.clone())
}

async fn create_category(
    State(state): State<Shared>,
    Json(payload): Json<CategoryPayload>,
) -> Reply<Category> {
    let mut backend = lock(&state);
    if backend.categories.iter().any(|c| c.name == payload.name) {
        return fail(StatusCode::CONFLICT, "Category already exists with this value");
    }
    let category = Category {
        id: backend.next_id(),
        name: payload.name,
    };
    backend.categories.push(category.clone());
    created(category)
}

async fn update_category(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryPayload>,
) -> Reply<Category> {
    let mut backend = lock(&state);
    match backend.categories.iter_mut().find(|c| c.id == id) {
        Some(category) => {
            category.name = payload.name;
            ok(category.clone())
        }
        None => fail(StatusCode::NOT_FOUND, "Category not found"),
    }
}

async fn delete_category(State(state): State<Shared>, Path(id): Path<i64>) -> Reply<Category> {
    let mut backend = lock(&state);
    if backend.products.iter().any(|p| p.category_id == id) {
        return fail(
            StatusCode::CONFLICT,
            "Cannot delete, record is being used by other data",
        );
    }
    match backend.categories.iter().position(|c| c.id == id) {
        Some(index) => ok(backend.categories.remove(index)),
        None => fail(StatusCode::NOT_FOUND, "Category not found"),
    }
}

// ========== Sizes ==========

async fn list_sizes(State(state): State<Shared>) -> Response {
    let backend = lock(&state);
    if backend.break_size_listing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }
    ok(backend.sizes.clone()).into_response()
}

async fn create_size(State(state): State<Shared>, Json(payload): Json<NewSize>) -> Reply<Size> {
    let mut backend = lock(&state);
    let display_order = backend
        .sizes
        .iter()
        .map(|s| s.display_order)
        .max()
        .unwrap_or(0)
        + 1;
    let size = Size {
        id: backend.next_id(),
        name: payload.name,
        display_order,
    };
    backend.sizes.push(size.clone());
    created(size)
}

async fn update_size(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(payload): Json<SizeUpdate>,
) -> Reply<Size> {
    let mut backend = lock(&state);
    if backend.reject_size_updates_for == Some(id) {
        return fail(StatusCode::CONFLICT, "Size was modified by another session");
    }
    if let Some(budget) = backend.size_update_budget.as_mut() {
        if *budget == 0 {
            return fail(StatusCode::CONFLICT, "Size was modified by another session");
        }
        *budget -= 1;
    }
    // display_order is a unique column
    if let Some(order) = payload.display_order
        && backend
            .sizes
            .iter()
            .any(|s| s.id != id && s.display_order == order)
    {
        return fail(StatusCode::CONFLICT, "Display order already in use");
    }
    match backend.sizes.iter_mut().find(|s| s.id == id) {
        Some(size) => {
            if let Some(name) = payload.name {
                size.name = name;
            }
            if let Some(order) = payload.display_order {
                size.display_order = order;
            }
            ok(size.clone())
        }
        None => fail(StatusCode::NOT_FOUND, "Size not found"),
    }
}

async fn delete_size(State(state): State<Shared>, Path(id): Path<i64>) -> Reply<Size> {
    let mut backend = lock(&state);
    match backend.sizes.iter().position(|s| s.id == id) {
        Some(index) => {
            for product in &mut backend.products {
                product.sizes.retain(|l| l.size_id != id);
            }
            ok(backend.sizes.remove(index))
        }
        None => fail(StatusCode::NOT_FOUND, "Size not found"),
    }
}

// ========== Products ==========

async fn list_products(State(state): State<Shared>) -> Reply<Vec<Product>> {
    ok(lock(&state).products.clone())
}

#[derive(Deserialize)]
struct SearchParams {
    search_query: String,
}

async fn search_products(
    State(state): State<Shared>,
    Query(params): Query<SearchParams>,
) -> Reply<Vec<Product>> {
    let mut backend = lock(&state);
    backend.searches.push(params.search_query.clone());
    let term = params.search_query.to_lowercase();
    let found = backend
        .products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&term))
        .cloned()
        .collect();
    ok(found)
}

async fn create_product(State(state): State<Shared>, mut multipart: Multipart) -> Reply<Product> {
    let mut name = None;
    let mut category_id = None;
    let mut description = None;
    let mut upload = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = field.text().await.ok(),
            "category_id" => {
                category_id = field.text().await.ok().and_then(|v| v.parse::<i64>().ok())
            }
            "description" => description = field.text().await.ok(),
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                upload = Some(Upload {
                    file_name,
                    content_type,
                    len,
                });
            }
            _ => {}
        }
    }

    let (Some(name), Some(category_id)) = (name, category_id) else {
        return fail(StatusCode::UNPROCESSABLE_ENTITY, "Required field cannot be empty");
    };

    let mut backend = lock(&state);
    if !backend.categories.iter().any(|c| c.id == category_id) {
        return fail(
            StatusCode::CONFLICT,
            "Cannot delete or update, record is linked to other data",
        );
    }
    let image = upload.as_ref().map(|u| format!("/uploads/{}", u.file_name));
    if let Some(upload) = upload {
        backend.uploads.push(upload);
    }
    let product = Product {
        id: backend.next_id(),
        name,
        description,
        image,
        category_id,
        sizes: Vec::new(),
    };
    backend.products.push(product.clone());
    created(product)
}

// ========== Product sizes ==========

async fn attach_size(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(payload): Json<NewSizeLink>,
) -> Reply<Product> {
    let mut backend = lock(&state);
    let Some(size_name) = backend
        .sizes
        .iter()
        .find(|s| s.id == payload.size_id)
        .map(|s| s.name.clone())
    else {
        return fail(StatusCode::NOT_FOUND, "Size not found");
    };
    let Some(product) = backend.products.iter_mut().find(|p| p.id == id) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    if product.has_size(payload.size_id) {
        return fail(StatusCode::CONFLICT, "Product size already exists");
    }
    product.sizes.push(ProductSizeLink {
        size_id: payload.size_id,
        size_name,
        price: payload.price,
        stock: payload.stock,
    });
    created(product.clone())
}

async fn update_size_link(
    State(state): State<Shared>,
    Path((id, size_id)): Path<(i64, i64)>,
    Json(payload): Json<SizeLinkUpdate>,
) -> Reply<Product> {
    let mut backend = lock(&state);
    let Some(product) = backend.products.iter_mut().find(|p| p.id == id) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    let Some(link) = product.sizes.iter_mut().find(|l| l.size_id == size_id) else {
        return fail(StatusCode::NOT_FOUND, "Product size not found");
    };
    if let Some(price) = payload.price {
        link.price = price;
    }
    if let Some(stock) = payload.stock {
        link.stock = stock;
    }
    ok(product.clone())
}

async fn detach_size(
    State(state): State<Shared>,
    Path((id, size_id)): Path<(i64, i64)>,
) -> Reply<Product> {
    let mut backend = lock(&state);
    let Some(product) = backend.products.iter_mut().find(|p| p.id == id) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    product.sizes.retain(|l| l.size_id != size_id);
    ok(product.clone())
}

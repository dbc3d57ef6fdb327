//! Marketplace catalogue handlers.
//!
//! ```text
//! GET /api/v1/marketplace/products?category=electronics&minPrice=100&limit=20
//! POST /api/v1/marketplace/products {"name":"...","description":"...","category":"...","price":1500,"stock":3}
//! GET|PUT|DELETE /api/v1/marketplace/products/{id}
//! GET /api/v1/marketplace/categories
//! GET /api/v1/marketplace/search?q=jiko
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::PageInfo;
use serde::{Deserialize, Serialize};

use crate::domain::{
    CategorySummary, Error, Product, ProductDraft, ProductFilter, ProductPatch, ProductStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::envelope::{Removed, created, ok, ok_with_message};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{non_blank, page_request};

/// Filters shared by the listing and search endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub county: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub seller_id: Option<String>,
    /// `active` (default), `inactive` or `all`.
    pub status: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductQuery {
    fn filter(&self) -> Result<ProductFilter, Error> {
        let status = match non_blank(self.status.clone()).as_deref() {
            None => Some(ProductStatus::Active),
            Some("all") => None,
            Some(raw) => Some(raw.parse::<ProductStatus>()?),
        };
        Ok(ProductFilter {
            category: non_blank(self.category.clone()),
            county: non_blank(self.county.clone()),
            min_price: self.min_price,
            max_price: self.max_price,
            search: non_blank(self.search.clone()),
            seller_id: non_blank(self.seller_id.clone()),
            status,
        })
    }
}

/// Body for `POST /marketplace/products`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub stock: i32,
    pub images: Vec<String>,
    pub county: Option<String>,
    pub town: Option<String>,
}

impl From<ProductRequest> for ProductDraft {
    fn from(value: ProductRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            category: value.category,
            price: value.price,
            stock: value.stock,
            images: value.images,
            county: value.county,
            town: value.town,
        }
    }
}

/// Body for `PUT /marketplace/products/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
    pub status: Option<String>,
    pub county: Option<String>,
    pub town: Option<String>,
}

impl TryFrom<ProductUpdateRequest> for ProductPatch {
    type Error = Error;

    fn try_from(value: ProductUpdateRequest) -> Result<Self, Self::Error> {
        let status = value
            .status
            .as_deref()
            .map(|raw| raw.trim().parse::<ProductStatus>())
            .transpose()?;
        Ok(Self {
            name: value.name,
            description: value.description,
            category: value.category,
            price: value.price,
            stock: value.stock,
            images: value.images,
            status,
            county: value.county,
            town: value.town,
        })
    }
}

#[derive(Debug, Serialize)]
struct ProductBody {
    product: Product,
}

#[derive(Debug, Serialize)]
struct ProductList {
    products: Vec<Product>,
    pagination: PageInfo,
}

#[derive(Debug, Serialize)]
struct SearchResults {
    query: String,
    products: Vec<Product>,
    pagination: PageInfo,
}

#[derive(Debug, Serialize)]
struct CategoryList {
    categories: Vec<CategorySummary>,
}

/// Page through listings, newest first.
#[get("/marketplace/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ProductQuery>,
) -> ApiResult<HttpResponse> {
    let page = page_request(query.limit, query.offset)?;
    let products = state.catalogue.list(query.filter()?, page).await?;
    let pagination = products.info(page);
    Ok(ok(ProductList {
        products: products.items,
        pagination,
    }))
}

/// Publish a listing owned by the caller.
#[post("/marketplace/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let seller = caller.require_user()?;
    let product = state
        .catalogue
        .create(seller.user_id(), payload.into_inner().into())
        .await?;
    Ok(created(ProductBody { product }, "Product created successfully"))
}

/// Fetch one listing.
#[get("/marketplace/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let product = state.catalogue.get(&path).await?;
    Ok(ok(ProductBody { product }))
}

/// Edit a listing; only its seller may do so.
#[put("/marketplace/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<ProductUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let seller = caller.require_user()?;
    let patch = ProductPatch::try_from(payload.into_inner())?;
    let product = state
        .catalogue
        .update(seller.user_id(), &path, patch)
        .await?;
    Ok(ok_with_message(
        ProductBody { product },
        "Product updated successfully",
    ))
}

/// Remove a listing; only its seller may do so.
#[delete("/marketplace/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let seller = caller.require_user()?;
    state.catalogue.delete(seller.user_id(), &path).await?;
    Ok(ok_with_message(
        Removed { id: &path },
        "Product deleted successfully",
    ))
}

/// Distinct categories of active listings.
#[get("/marketplace/categories")]
pub async fn list_categories(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let categories = state.catalogue.categories().await?;
    Ok(ok(CategoryList { categories }))
}

/// Full-text search over names and descriptions.
#[get("/marketplace/search")]
pub async fn search_products(
    state: web::Data<HttpState>,
    query: web::Query<ProductQuery>,
) -> ApiResult<HttpResponse> {
    let page = page_request(query.limit, query.offset)?;
    let filter = query.filter()?;
    let term = non_blank(query.q.clone());
    let products = state
        .catalogue
        .search(term.clone(), filter, page)
        .await?;
    let pagination = products.info(page);
    Ok(ok(SearchResults {
        query: term.unwrap_or_default(),
        products: products.items,
        pagination,
    }))
}

/// Register the catalogue routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_categories)
        .service(search_products)
        .service(list_products)
        .service(create_product)
        .service(get_product)
        .service(update_product)
        .service(delete_product);
}

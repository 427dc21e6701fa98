use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use pricing::{Offer, Product};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use validator::Validate;

use crate::api::extract::ValidatedJson;
use crate::api::response::ApiResponse;
use crate::error::AppError;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products).post(replace_products))
        .route("/products/items", post(create_product))
        .route("/products/{id}/offers", post(add_offer))
        .route("/products/{id}/offers/{index}", put(update_offer))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    #[validate(length(min = 1, message = "Firm cannot be empty"))]
    pub firm: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    pub kdv_rate: f64,
}

impl From<OfferRequest> for Offer {
    fn from(request: OfferRequest) -> Self {
        Offer::new(request.firm, request.price, request.kdv_rate)
    }
}

/// 按原样返回，读取失败时返回 `{ products: [] }`
async fn list_products(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.products.list_raw().await)
}

/// 整体覆盖 products.json，失败时返回 `{ success: false, error }`
async fn replace_products(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResponse<()> {
    let document: Value = match serde_json::from_slice(&body) {
        Ok(document) => document,
        Err(err) => {
            warn!(error = %err, "rejected products document");
            return ApiResponse::failure(err.to_string());
        }
    };

    match state.products.replace_raw(&document).await {
        Ok(()) => ApiResponse::ok(),
        Err(err) => {
            warn!(error = %err, "failed to save products document");
            ApiResponse::failure(err.to_string())
        }
    }
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> Result<ApiResponse<Product>, AppError> {
    let product = state.products.add_product(&payload.name).await?;

    Ok(ApiResponse::success(product))
}

async fn add_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    ValidatedJson(payload): ValidatedJson<OfferRequest>,
) -> Result<ApiResponse<Product>, AppError> {
    let product = state.products.add_offer(id, payload.into()).await?;

    Ok(ApiResponse::success(product))
}

async fn update_offer(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(u64, usize)>,
    ValidatedJson(payload): ValidatedJson<OfferRequest>,
) -> Result<ApiResponse<Product>, AppError> {
    let product = state.products.update_offer(id, index, payload.into()).await?;

    Ok(ApiResponse::success(product))
}

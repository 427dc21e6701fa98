use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use pricing::{HistoryDocument, ProductsDocument};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api::{history, pages, products};
use crate::config::Config;
use crate::domain::services::{HistoryService, ProductService};
use crate::infrastructure::storage::JsonFileStore;
use crate::middleware::log_errors::log_errors;

pub type ProductStore = JsonFileStore<ProductsDocument>;
pub type HistoryStore = JsonFileStore<HistoryDocument>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub products: Arc<ProductService<ProductStore, HistoryStore>>,
    pub history: Arc<HistoryService<HistoryStore>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let product_store = Arc::new(ProductStore::new(config.products_path()));
        let history_store = Arc::new(HistoryStore::new(config.history_path()));

        let history = Arc::new(HistoryService::new(history_store, config.storage.history_limit));
        let products = Arc::new(ProductService::new(product_store, history.clone()));

        Self {
            config,
            products,
            history,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let app_state = Arc::new(state);

    // API 路由
    let api_routes = Router::new()
        .merge(products::routes())
        .merge(history::routes());

    Router::new()
        .nest("/api", api_routes)
        .merge(pages::routes())
        .route("/health", get(health))
        .fallback(handler_404)
        .layer(middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(app_state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}

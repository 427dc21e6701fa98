use std::sync::Arc;

use chrono::Utc;
use pricing::{is_supported_rate, HistoryDocument, HistoryRecord, Offer, Product, ProductsDocument, KDV_RATES};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::domain::services::HistoryService;
use crate::error::AppError;
use crate::infrastructure::storage::DocumentStore;

pub struct ProductService<P, H> {
    store: Arc<P>,
    history: Arc<HistoryService<H>>,
}

impl<P, H> ProductService<P, H>
where
    P: DocumentStore<ProductsDocument>,
    H: DocumentStore<HistoryDocument>,
{
    pub fn new(store: Arc<P>, history: Arc<HistoryService<H>>) -> Self {
        Self { store, history }
    }

    /// 读取失败时返回空列表
    pub async fn list(&self) -> ProductsDocument {
        self.store.load_or_default().await
    }

    /// 按原样返回 products.json，读取失败时返回 `{ products: [] }`
    pub async fn list_raw(&self) -> Value {
        match self.store.load_raw().await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "failed to load products document, using empty default");
                json!({ "products": [] })
            }
        }
    }

    /// 整体覆盖，按原样保存，最后一次写入生效
    pub async fn replace_raw(&self, document: &Value) -> Result<(), AppError> {
        let Some(products) = document.get("products").and_then(Value::as_array) else {
            return Err(AppError::BadRequest(
                "expected an object with a products array".to_string(),
            ));
        };
        let count = products.len();

        self.store.save_raw(document).await?;
        info!(products = count, "products document replaced");
        Ok(())
    }

    pub async fn add_product(&self, name: &str) -> Result<Product, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Product name cannot be empty".to_string()));
        }

        let product = self
            .store
            .update(|doc| -> Result<Product, AppError> { Ok(doc.push_product(name).clone()) })
            .await?;

        info!(id = product.id, name = %product.name, "product added");
        Ok(product)
    }

    pub async fn add_offer(&self, product_id: u64, offer: Offer) -> Result<Product, AppError> {
        let offer = normalize_offer(offer)?;

        let product = self
            .store
            .update(|doc| -> Result<Product, AppError> {
                let product = doc
                    .find_mut(product_id)
                    .ok_or_else(|| product_not_found(product_id))?;
                product.offers.push(offer);
                Ok(product.clone())
            })
            .await?;

        info!(id = product_id, offers = product.offers.len(), "offer added");
        Ok(product)
    }

    /// 替换一条报价；价格有变化时写入一条历史记录
    pub async fn update_offer(
        &self,
        product_id: u64,
        index: usize,
        offer: Offer,
    ) -> Result<Product, AppError> {
        let offer = normalize_offer(offer)?;

        let (product, old_price) = self
            .store
            .update(|doc| -> Result<(Product, f64), AppError> {
                let product = doc
                    .find_mut(product_id)
                    .ok_or_else(|| product_not_found(product_id))?;
                let slot = product.offers.get_mut(index).ok_or_else(|| {
                    AppError::NotFound(format!("Offer {} of product {} not found", index, product_id))
                })?;
                let old_price = slot.price;
                *slot = offer;
                Ok((product.clone(), old_price))
            })
            .await?;

        let updated = &product.offers[index];
        if updated.price != old_price {
            let record = HistoryRecord::price_change(
                &product.name,
                &updated.firm,
                old_price,
                updated.price,
                updated.kdv_rate,
                Utc::now(),
            );
            self.history.record(record).await?;
        }

        info!(id = product_id, index, "offer updated");
        Ok(product)
    }
}

fn product_not_found(product_id: u64) -> AppError {
    AppError::NotFound(format!("Product {} not found", product_id))
}

/// 校验税率与价格，并重新计算含税价
fn normalize_offer(offer: Offer) -> Result<Offer, AppError> {
    let firm = offer.firm.trim();
    if firm.is_empty() {
        return Err(AppError::Validation("Firm cannot be empty".to_string()));
    }
    if !offer.price.is_finite() || offer.price < 0.0 {
        return Err(AppError::Validation(format!("Invalid price: {}", offer.price)));
    }
    if !is_supported_rate(offer.kdv_rate) {
        return Err(AppError::Validation(format!(
            "Unsupported KDV rate {}, expected one of {:?}",
            offer.kdv_rate, KDV_RATES
        )));
    }

    Ok(Offer::new(firm, offer.price, offer.kdv_rate))
}

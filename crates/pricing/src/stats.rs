use serde::Serialize;

use crate::kdv::round_to;
use crate::model::Product;

/// 页面顶部的统计卡片
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_offers: usize,
    /// 平均每个产品的报价数，保留一位小数
    pub offers_per_product: f64,
}

impl DashboardStats {
    pub fn from_products(products: &[Product]) -> Self {
        let total_products = products.len();
        let total_offers = products.iter().map(|p| p.offers.len()).sum();
        let offers_per_product = if total_products == 0 {
            0.0
        } else {
            round_to(total_offers as f64 / total_products as f64, 1)
        };

        Self {
            total_products,
            total_offers,
            offers_per_product,
        }
    }
}

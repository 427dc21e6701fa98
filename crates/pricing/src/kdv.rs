//! KDV（增值税）相关计算

use serde::{Deserialize, Serialize};

use crate::model::Offer;

/// 界面上可选的 KDV 税率（百分比）
pub const KDV_RATES: [u8; 3] = [1, 10, 20];

/// 含税价 = 不含税价 + 不含税价 * 税率 / 100
pub fn price_with_kdv(price: f64, kdv_rate: f64) -> f64 {
    price + price * kdv_rate / 100.0
}

/// 四舍五入到指定小数位
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn is_supported_rate(kdv_rate: f64) -> bool {
    KDV_RATES.iter().any(|&rate| f64::from(rate) == kdv_rate)
}

/// 单个产品所有报价的平均价（保留两位小数）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAverages {
    pub avg_with_kdv: f64,
    pub avg_without_kdv: f64,
}

pub fn average_prices(offers: &[Offer]) -> PriceAverages {
    if offers.is_empty() {
        return PriceAverages::default();
    }

    let (with_kdv, without_kdv) = offers.iter().fold((0.0, 0.0), |(with, without), offer| {
        (with + offer.effective_price_with_kdv(), without + offer.price)
    });
    let count = offers.len() as f64;

    PriceAverages {
        avg_with_kdv: round_to(with_kdv / count, 2),
        avg_without_kdv: round_to(without_kdv / count, 2),
    }
}

/// 按含税价从高到低排列报价，附带原始下标（稳定排序，同价保持原顺序）
pub fn offers_by_price_desc(offers: &[Offer]) -> Vec<(usize, &Offer)> {
    let mut ordered: Vec<_> = offers.iter().enumerate().collect();
    ordered.sort_by(|(_, a), (_, b)| {
        b.effective_price_with_kdv()
            .total_cmp(&a.effective_price_with_kdv())
    });
    ordered
}

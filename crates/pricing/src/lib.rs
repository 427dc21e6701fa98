//! pricing - 报价比较的领域模型与计算
//!
//! 产品、报价、价格变动记录，以及 KDV（增值税）含税价、平均价、
//! 报价排序和产品搜索等纯计算逻辑。

pub mod history;
pub mod kdv;
pub mod model;
pub mod search;
pub mod stats;

pub use history::{HistoryDocument, HistoryRecord, PriceDirection, HISTORY_LIMIT};
pub use kdv::{
    average_prices, is_supported_rate, offers_by_price_desc, price_with_kdv, round_to, PriceAverages,
    KDV_RATES,
};
pub use model::{Offer, Product, ProductsDocument};
pub use search::filter_products;
pub use stats::DashboardStats;

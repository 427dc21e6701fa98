use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 历史记录最多保留的条数
pub const HISTORY_LIMIT: usize = 100;

/// 一次报价价格变动
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub product_name: String,
    pub firm: String,
    pub old_price: f64,
    pub new_price: f64,
    pub price_change: f64,
    pub kdv_rate: f64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDirection {
    Up,
    Down,
}

impl HistoryRecord {
    pub fn price_change(
        product_name: impl Into<String>,
        firm: impl Into<String>,
        old_price: f64,
        new_price: f64,
        kdv_rate: f64,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            firm: firm.into(),
            old_price,
            new_price,
            price_change: new_price - old_price,
            kdv_rate,
            date,
        }
    }

    /// 涨价为 Up，其余（包括不变）为 Down
    pub fn direction(&self) -> PriceDirection {
        if self.price_change > 0.0 {
            PriceDirection::Up
        } else {
            PriceDirection::Down
        }
    }
}

/// history.json 的完整内容，最新的记录在最前
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument {
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
}

impl HistoryDocument {
    /// 插入到最前面，并截断到 `limit` 条
    pub fn prepend(&mut self, record: HistoryRecord, limit: usize) {
        self.history.insert(0, record);
        self.history.truncate(limit);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

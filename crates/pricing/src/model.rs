use serde::{Deserialize, Deserializer, Serialize};

use crate::kdv::price_with_kdv;

/// 某个产品的一条报价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub firm: String,
    /// 不含税价格
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
    /// KDV 税率（百分比）
    #[serde(default, deserialize_with = "number_or_string")]
    pub kdv_rate: f64,
    /// 冗余存储的含税价，旧数据里可能缺失
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_with_kdv: Option<f64>,
}

impl Offer {
    pub fn new(firm: impl Into<String>, price: f64, kdv_rate: f64) -> Self {
        Self {
            firm: firm.into(),
            price,
            kdv_rate,
            price_with_kdv: Some(price_with_kdv(price, kdv_rate)),
        }
    }

    /// 含税价：优先使用存储值，缺失（或为 0）时重新计算
    pub fn effective_price_with_kdv(&self) -> f64 {
        match self.price_with_kdv {
            Some(value) if value != 0.0 => value,
            _ => price_with_kdv(self.price, self.kdv_rate),
        }
    }
}

/// 表单提交的数值可能是字符串（如 `"120"`），两种写法都接受
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub offers: Vec<Offer>,
}

impl Product {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            offers: Vec::new(),
        }
    }
}

/// products.json 的完整内容，每次写入整体替换
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductsDocument {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductsDocument {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// 下一个可用的产品 ID。
    ///
    /// 取现有最大 ID 加一，而不是 `len + 1`，删除产品后也不会产生重复 ID。
    pub fn next_id(&self) -> u64 {
        self.products.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    pub fn find(&self, id: u64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: u64) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    /// 追加一个没有报价的新产品，返回它的引用
    pub fn push_product(&mut self, name: impl Into<String>) -> &Product {
        let product = Product::new(self.next_id(), name);
        self.products.push(product);
        &self.products[self.products.len() - 1]
    }
}

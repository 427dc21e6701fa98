use crate::model::Product;

/// 按名称过滤产品：不区分大小写的子串匹配，空关键字返回全部
pub fn filter_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let term = term.to_lowercase();
    products
        .iter()
        .filter(|product| product.name.to_lowercase().contains(&term))
        .collect()
}

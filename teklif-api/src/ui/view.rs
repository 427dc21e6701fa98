use pricing::{
    filter_products, is_supported_rate, offers_by_price_desc, DashboardStats, Offer, Product,
    ProductsDocument,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Product(u64),
}

/// 报价表单的输入内容，价格保持为原始字符串
#[derive(Debug, Clone, PartialEq)]
pub struct OfferDraft {
    pub firm: String,
    pub price: String,
    pub kdv_rate: f64,
}

impl Default for OfferDraft {
    fn default() -> Self {
        Self {
            firm: String::new(),
            price: String::new(),
            kdv_rate: 1.0,
        }
    }
}

impl OfferDraft {
    pub fn from_offer(offer: &Offer) -> Self {
        Self {
            firm: offer.firm.clone(),
            price: offer.price.to_string(),
            kdv_rate: offer.kdv_rate,
        }
    }

    /// 公司名非空、价格为非负数字且税率可选时才能生成报价
    pub fn to_offer(&self) -> Option<Offer> {
        let firm = self.firm.trim();
        if firm.is_empty() || !is_supported_rate(self.kdv_rate) {
            return None;
        }

        let price: f64 = self.price.trim().parse().ok()?;
        if !price.is_finite() || price < 0.0 {
            return None;
        }

        Some(Offer::new(firm, price, self.kdv_rate))
    }
}

/// 待提交的新报价
#[derive(Debug, Clone, PartialEq)]
pub struct OfferSubmission {
    pub product_id: u64,
    pub offer: Offer,
}

/// 产品列表页的状态
#[derive(Debug, Clone, Default)]
pub struct ProductListView {
    products: Vec<Product>,
    selection: Selection,
    search: String,
    draft: OfferDraft,
}

impl ProductListView {
    pub fn new(document: ProductsDocument) -> Self {
        Self {
            products: document.products,
            ..Self::default()
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_product(&self) -> Option<&Product> {
        match self.selection {
            Selection::None => None,
            Selection::Product(id) => self.products.iter().find(|p| p.id == id),
        }
    }

    /// 选中产品；ID 不存在时保持原状态
    pub fn select(&mut self, id: u64) -> bool {
        if self.products.iter().any(|p| p.id == id) {
            self.selection = Selection::Product(id);
            true
        } else {
            false
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// 搜索与选中状态互不影响
    pub fn filtered_products(&self) -> Vec<&Product> {
        filter_products(&self.products, &self.search)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_products(&self.products)
    }

    /// 选中产品的报价，按含税价从高到低
    pub fn sorted_offers(&self) -> Vec<(usize, &Offer)> {
        self.selected_product()
            .map(|product| offers_by_price_desc(&product.offers))
            .unwrap_or_default()
    }

    pub fn draft(&self) -> &OfferDraft {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: OfferDraft) {
        self.draft = draft;
    }

    /// 本地追加一个新产品，返回需要持久化的产品；名称为空时忽略
    pub fn add_product(&mut self, name: &str) -> Option<Product> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let id = self.products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let product = Product::new(id, name);
        self.products.push(product.clone());
        Some(product)
    }

    /// 把表单中的报价加到选中的产品上，成功后重置表单
    pub fn add_offer(&mut self) -> Option<OfferSubmission> {
        let Selection::Product(product_id) = self.selection else {
            return None;
        };
        let offer = self.draft.to_offer()?;
        let product = self.products.iter_mut().find(|p| p.id == product_id)?;

        product.offers.push(offer.clone());
        self.draft = OfferDraft::default();

        Some(OfferSubmission { product_id, offer })
    }
}

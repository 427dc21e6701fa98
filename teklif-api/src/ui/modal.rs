use pricing::Product;

use crate::ui::view::OfferDraft;
use crate::ui::DESKTOP_BREAKPOINT_PX;

/// 正在编辑的报价
#[derive(Debug, Clone, PartialEq)]
pub struct EditingOffer {
    pub product_id: u64,
    pub index: usize,
    pub draft: OfferDraft,
}

/// 报价编辑弹窗，只在窄屏下显示。
///
/// 弹窗本身不做持久化，提交和取消都交给调用方的回调处理。
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditOfferModal {
    #[default]
    Closed,
    Open(EditingOffer),
}

impl EditOfferModal {
    /// 打开某个产品第 `index` 条报价；报价不存在时保持关闭
    pub fn open(product: &Product, index: usize) -> Self {
        match product.offers.get(index) {
            Some(offer) => EditOfferModal::Open(EditingOffer {
                product_id: product.id,
                index,
                draft: OfferDraft::from_offer(offer),
            }),
            None => EditOfferModal::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, EditOfferModal::Open(_))
    }

    /// 宽屏布局直接在列表中编辑，不显示弹窗。
    ///
    /// 服务端拿不到视口宽度，页面用同一个断点生成 media query（见 `render::stylesheet`）。
    pub fn is_visible(&self, viewport_width: u32) -> bool {
        self.is_open() && viewport_width < DESKTOP_BREAKPOINT_PX
    }

    pub fn editing(&self) -> Option<&EditingOffer> {
        match self {
            EditOfferModal::Open(editing) => Some(editing),
            EditOfferModal::Closed => None,
        }
    }

    /// 修改表单字段，关闭状态下不做任何事
    pub fn edit(&mut self, change: impl FnOnce(&mut OfferDraft)) {
        if let EditOfferModal::Open(editing) = self {
            change(&mut editing.draft);
        }
    }

    /// 把当前内容交给 `on_submit`，然后关闭
    pub fn submit<R>(&mut self, on_submit: impl FnOnce(EditingOffer) -> R) -> Option<R> {
        match std::mem::take(self) {
            EditOfferModal::Open(editing) => Some(on_submit(editing)),
            EditOfferModal::Closed => None,
        }
    }

    /// 放弃修改并关闭
    pub fn cancel(&mut self, on_close: impl FnOnce()) {
        if self.is_open() {
            *self = EditOfferModal::Closed;
            on_close();
        }
    }
}

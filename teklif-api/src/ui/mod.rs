//! 浏览器界面的状态与服务端渲染
//!
//! 选中状态、搜索关键字、弹窗等界面状态都用显式的类型表示，
//! 页面由 [`render`] 根据这些状态生成 HTML。

pub mod history_panel;
pub mod modal;
pub mod render;
pub mod view;

pub use history_panel::HistoryPanel;
pub use modal::{EditOfferModal, EditingOffer};
pub use view::{OfferDraft, OfferSubmission, ProductListView, Selection};

/// 桌面布局的最小宽度（px），更宽时在列表中直接编辑报价
pub const DESKTOP_BREAKPOINT_PX: u32 = 1024;

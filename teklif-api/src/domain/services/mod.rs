pub mod history_service;
pub mod product_service;

pub use history_service::HistoryService;
pub use product_service::ProductService;

pub mod extract;
pub mod history;
pub mod pages;
pub mod products;
pub mod response;

pub mod catalog_repo;
pub mod memory;
pub mod models;
pub mod order_repo;
pub mod stripe;

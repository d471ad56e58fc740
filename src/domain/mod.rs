pub mod cart;
pub mod catalog;
pub mod context;
pub mod errors;
pub mod order;
pub mod ports;

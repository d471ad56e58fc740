pub mod admin;
pub mod catalog;
pub mod order_workflow;

//! Database models and DTOs for all domain entities.

pub mod admin;
pub mod customer;
pub mod dashboard;
pub mod order;
pub mod pagination;
pub mod product;
pub mod stats;

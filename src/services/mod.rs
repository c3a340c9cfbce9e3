//! Business logic services.

pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod snapshot_store;
pub mod stats;
pub mod stats_queries;

//! Request extractors: authentication, role checks and validated bodies.

pub mod auth;
pub mod rbac;
pub mod validation;

//! service-core: shared infrastructure for Swensi services.

pub mod error;
pub mod middleware;
pub mod observability;

// crates/crm-backend-lib/src/api/mod.rs

//! HTTP API: route table and handlers.

pub mod accounts;
pub mod login;
pub mod router;

pub use router::create_router;

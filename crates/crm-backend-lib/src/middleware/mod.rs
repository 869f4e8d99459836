// crates/crm-backend-lib/src/middleware/mod.rs

//! Request interceptors for the `/api` surface: auth-required,
//! access-required and the auditor, applied in a fixed order.

pub mod access_required;
pub mod audit;
pub mod auth_required;

pub use access_required::access_required;
pub use audit::audit;
pub use auth_required::{auth_required, AuthIdentity};

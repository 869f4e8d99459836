// ============================
// crm-backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod authenticator;
pub mod password;
pub mod session;

pub use authenticator::{
    Authenticator, AutoProvision, BuiltinAuthenticator, Directory, LdapAuthenticator,
};
pub use password::{hash_password, hash_password_secure, verify_password};
pub use session::{Session, SessionManager, SESSION_TTL};

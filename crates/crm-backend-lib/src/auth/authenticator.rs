// ============================
// crm-backend-lib/src/auth/authenticator.rs
// ============================
//! Pluggable credential verification.
use async_trait::async_trait;

use crate::auth::password::verify_password;
use crate::error::AppError;

/// Auto-provisioning policy for first-time externally-authenticated users.
///
/// Exposed as a capability on every authenticator so callers never need to
/// inspect the concrete variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoProvision {
    Disabled,
    /// Create a local account with this single default role.
    CreateWithRole(String),
}

/// Credential-verification strategy.
///
/// The builtin variant compares against the stored hash supplied by the
/// caller; directory-backed variants receive an empty hash and consult
/// their own backend.
#[async_trait]
pub trait Authenticator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AppError>;

    fn auto_provision(&self) -> AutoProvision {
        AutoProvision::Disabled
    }
}

/// Builtin authenticator: scrypt comparison against the account's stored hash.
pub struct BuiltinAuthenticator;

#[async_trait]
impl Authenticator for BuiltinAuthenticator {
    fn name(&self) -> &'static str {
        "builtin"
    }

    async fn authenticate(
        &self,
        _username: &str,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        Ok(verify_password(password_hash, password))
    }
}

/// Directory bind collaborator for externally-verified credentials. The LDAP
/// wire protocol itself lives outside this crate; tests supply an in-memory
/// directory.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn simple_bind(&self, username: &str, password: &str) -> Result<bool, AppError>;
}

/// LDAP-flavored authenticator: delegates the bind to a [`Directory`] and
/// carries the local auto-provisioning policy.
pub struct LdapAuthenticator<D> {
    directory: D,
    autocreate_users: bool,
    default_access_level: String,
}

impl<D: Directory> LdapAuthenticator<D> {
    pub fn new(directory: D, autocreate_users: bool, default_access_level: String) -> Self {
        Self {
            directory,
            autocreate_users,
            default_access_level,
        }
    }
}

#[async_trait]
impl<D: Directory> Authenticator for LdapAuthenticator<D> {
    fn name(&self) -> &'static str {
        "ldap"
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        _password_hash: &str,
    ) -> Result<bool, AppError> {
        self.directory.simple_bind(username, password).await
    }

    fn auto_provision(&self) -> AutoProvision {
        if self.autocreate_users {
            AutoProvision::CreateWithRole(self.default_access_level.clone())
        } else {
            AutoProvision::Disabled
        }
    }
}

// ============================
// crm-backend-lib/src/manager.rs
// ============================
//! Manager façade: single point of access to authentication, sessions and
//! persistence for the HTTP layer.
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::auth::{hash_password, hash_password_secure, Authenticator, SessionManager};
use crate::error::AppError;
use crate::store::{AccountStore, EventStore};
use crm_common::{Account, Acl, AuthToken, Event};

/// The fixed default access-control set. Not persisted.
pub fn default_acls() -> Vec<Acl> {
    vec![
        Acl {
            role_name: "admin".to_string(),
            description: "full access".to_string(),
        },
        Acl {
            role_name: "readwrite".to_string(),
            description: "read and write access".to_string(),
        },
        Acl {
            role_name: "readonly".to_string(),
            description: "read-only access".to_string(),
        },
    ]
}

/// Façade over authenticator, session store and persistence.
#[async_trait]
pub trait Manager: Send + Sync {
    /// Verify credentials. `Ok(false)` is a clean mismatch; `Err(LoginFailure)`
    /// covers account-lookup and verifier failures.
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AppError>;

    /// The configured pluggable authenticator.
    fn authenticator(&self) -> &dyn Authenticator;

    async fn accounts(&self) -> Result<Vec<Account>, AppError>;
    async fn account(&self, username: &str) -> Result<Account, AppError>;
    /// Create an account, hashing any plaintext password it carries.
    async fn save_account(&self, account: Account) -> Result<(), AppError>;
    async fn delete_account(&self, username: &str) -> Result<(), AppError>;

    /// Issue a session-backed token bound to (username, user agent).
    async fn new_auth_token(&self, username: &str, user_agent: &str)
        -> Result<AuthToken, AppError>;
    /// `InvalidAuthToken` when the token is not live for this username.
    async fn verify_auth_token(&self, username: &str, token: &str) -> Result<(), AppError>;

    /// Re-hash and persist a new credential for an existing account.
    async fn change_password(&self, username: &str, new_password: String)
        -> Result<(), AppError>;

    async fn save_event(&self, event: Event) -> Result<(), AppError>;
    async fn events(&self, limit: usize) -> Result<Vec<Event>, AppError>;
    async fn purge_events(&self) -> Result<(), AppError>;
    /// Fire-and-forget audit logging; failures are logged, never propagated.
    async fn log_event(&self, event_type: &str, message: &str, username: &str, tags: Vec<String>);

    fn roles(&self) -> Vec<Acl>;
    fn role(&self, name: &str) -> Result<Acl, AppError>;
}

/// Default manager wired from a pluggable authenticator and the store
/// collaborators. Owns the session manager for the process lifetime.
pub struct DefaultManager {
    authenticator: Arc<dyn Authenticator>,
    sessions: SessionManager,
    accounts: Arc<dyn AccountStore>,
    events: Arc<dyn EventStore>,
}

impl DefaultManager {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        sessions: SessionManager,
        accounts: Arc<dyn AccountStore>,
        events: Arc<dyn EventStore>,
    ) -> Self {
        Self {
            authenticator,
            sessions,
            accounts,
            events,
        }
    }
}

#[async_trait]
impl Manager for DefaultManager {
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AppError> {
        // only load the account for the stored hash when using builtin auth
        let password_hash = if self.authenticator.name() == "builtin" {
            match self.accounts.get(username).await {
                Ok(account) => account.password,
                Err(err) => {
                    tracing::error!(username, %err, "login account lookup failed");
                    return Err(AppError::LoginFailure);
                }
            }
        } else {
            String::new()
        };

        match self
            .authenticator
            .authenticate(username, password, &password_hash)
            .await
        {
            Ok(ok) => Ok(ok),
            Err(err) => {
                tracing::error!(username, %err, "authenticator failure");
                Err(AppError::LoginFailure)
            }
        }
    }

    fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    async fn accounts(&self) -> Result<Vec<Account>, AppError> {
        let mut accounts = self.accounts.list().await?;
        for account in &mut accounts {
            account.password.clear();
        }
        Ok(accounts)
    }

    async fn account(&self, username: &str) -> Result<Account, AppError> {
        self.accounts.get(username).await
    }

    async fn save_account(&self, mut account: Account) -> Result<(), AppError> {
        if !account.password.is_empty() {
            account.password =
                hash_password(&account.password).map_err(|e| AppError::Internal(e.to_string()))?;
        }
        self.accounts.save(account).await
    }

    async fn delete_account(&self, username: &str) -> Result<(), AppError> {
        self.accounts.delete(username).await
    }

    async fn new_auth_token(
        &self,
        username: &str,
        user_agent: &str,
    ) -> Result<AuthToken, AppError> {
        let token = self
            .sessions
            .new_session(username.to_string(), user_agent.to_string())
            .await;
        Ok(AuthToken {
            token,
            username: username.to_string(),
            user_agent: user_agent.to_string(),
        })
    }

    async fn verify_auth_token(&self, username: &str, token: &str) -> Result<(), AppError> {
        self.sessions.verify(username, token).await
    }

    async fn change_password(
        &self,
        username: &str,
        mut new_password: String,
    ) -> Result<(), AppError> {
        let mut account = self.accounts.get(username).await?;
        account.password = hash_password_secure(&mut new_password)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        self.accounts.update(account).await
    }

    async fn save_event(&self, event: Event) -> Result<(), AppError> {
        self.events.append(event).await
    }

    async fn events(&self, limit: usize) -> Result<Vec<Event>, AppError> {
        self.events.list(limit).await
    }

    async fn purge_events(&self) -> Result<(), AppError> {
        self.events.purge().await
    }

    async fn log_event(&self, event_type: &str, message: &str, username: &str, tags: Vec<String>) {
        let event = Event {
            event_type: event_type.to_string(),
            time: Utc::now(),
            message: message.to_string(),
            username: username.to_string(),
            tags,
        };
        if let Err(err) = self.save_event(event).await {
            tracing::error!(%err, "logging event error");
        }
    }

    fn roles(&self) -> Vec<Acl> {
        default_acls()
    }

    fn role(&self, name: &str) -> Result<Acl, AppError> {
        self.roles()
            .into_iter()
            .find(|acl| acl.role_name == name)
            .ok_or(AppError::RoleDoesNotExist)
    }
}

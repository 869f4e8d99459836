// ============================
// crm-backend-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
use metrics::{counter, gauge};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;

/// Default auth-token TTL
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24); // 24 hours

/// Server-side session backing one issued auth token.
#[derive(Clone)]
pub struct Session {
    pub username: String,
    pub user_agent: String,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

/// Session manager for issued auth tokens. Owned by the manager for the
/// process lifetime; there is no global instance.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager and spawn the expiry sweep. `gc_lifetime`
    /// is the interval between sweeps.
    pub fn new(ttl: Duration, gc_lifetime: Duration) -> Self {
        let manager = SessionManager {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        };

        let manager_clone = manager.clone();
        tokio::spawn(async move {
            manager_clone.gc_task(gc_lifetime).await;
        });

        manager
    }

    /// Issue a token and record the session behind it.
    pub async fn new_session(&self, username: String, user_agent: String) -> String {
        let token = Uuid::new_v4().to_string();
        let now = SystemTime::now();
        let session = Session {
            username,
            user_agent,
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session);

        counter!("session.created").increment(1);
        gauge!("session.active").set(sessions.len() as f64);

        token
    }

    /// Get a session by token
    pub async fn get(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    /// Check that `token` belongs to a live session for `username`.
    pub async fn verify(&self, username: &str, token: &str) -> Result<(), AppError> {
        let sessions = self.sessions.read().await;
        match sessions.get(token) {
            Some(session)
                if session.username == username && SystemTime::now() < session.expires_at =>
            {
                Ok(())
            }
            _ => Err(AppError::InvalidAuthToken),
        }
    }

    /// Drop a session, invalidating its token.
    pub async fn remove(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(token).is_some() {
            gauge!("session.active").set(sessions.len() as f64);
        }
    }

    /// Periodic sweep that removes expired sessions for the process lifetime.
    async fn gc_task(&self, gc_lifetime: Duration) {
        loop {
            tokio::time::sleep(gc_lifetime).await;

            let mut sessions = self.sessions.write().await;
            let now = SystemTime::now();
            let before_count = sessions.len();

            sessions.retain(|_, session| now < session.expires_at);

            let removed = before_count - sessions.len();
            if removed > 0 {
                counter!("session.expired").increment(removed as u64);
                gauge!("session.active").set(sessions.len() as f64);
                tracing::debug!(removed, "expired sessions swept");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_verifies_for_its_username_only() {
        let sm = SessionManager::new(SESSION_TTL, Duration::from_secs(3600));
        let token = sm
            .new_session("admin".to_string(), "curl/8".to_string())
            .await;

        assert!(sm.verify("admin", &token).await.is_ok());
        assert!(matches!(
            sm.verify("mallory", &token).await,
            Err(AppError::InvalidAuthToken)
        ));
        assert!(matches!(
            sm.verify("admin", "no-such-token").await,
            Err(AppError::InvalidAuthToken)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let sm = SessionManager::new(Duration::from_secs(0), Duration::from_secs(3600));
        let token = sm
            .new_session("admin".to_string(), "curl/8".to_string())
            .await;
        // zero TTL: already past expires_at
        assert!(matches!(
            sm.verify("admin", &token).await,
            Err(AppError::InvalidAuthToken)
        ));
    }

    #[tokio::test]
    async fn removed_token_no_longer_verifies() {
        let sm = SessionManager::new(SESSION_TTL, Duration::from_secs(3600));
        let token = sm
            .new_session("admin".to_string(), "curl/8".to_string())
            .await;
        sm.remove(&token).await;
        assert!(sm.get(&token).await.is_none());
        assert!(sm.verify("admin", &token).await.is_err());
    }
}

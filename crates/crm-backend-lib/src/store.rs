// ============================
// crm-backend-lib/src/store.rs
// ============================
//! Persistence abstractions with in-memory implementations.
//!
//! The account and event stores are external collaborators by contract
//! (originally redis/mysql); the trait is the boundary and the in-memory
//! variants are the shipped implementation.
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::error::AppError;
use crm_common::{Account, Event};

/// Trait for account persistence backends
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// List every account
    async fn list(&self) -> Result<Vec<Account>, AppError>;

    /// Fetch one account; `AccountDoesNotExist` when no record matches
    async fn get(&self, username: &str) -> Result<Account, AppError>;

    /// Create an account; `AccountExists` on duplicate username
    async fn save(&self, account: Account) -> Result<(), AppError>;

    /// Replace an existing account; `AccountDoesNotExist` when absent
    async fn update(&self, account: Account) -> Result<(), AppError>;

    /// Remove an account; `AccountDoesNotExist` when absent
    async fn delete(&self, username: &str) -> Result<(), AppError>;
}

/// Trait for audit-event persistence backends
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append one event to the log
    async fn append(&self, event: Event) -> Result<(), AppError>;

    /// Most recent events first, at most `limit`
    async fn list(&self, limit: usize) -> Result<Vec<Event>, AppError>;

    /// Drop the whole log
    async fn purge(&self) -> Result<(), AppError>;
}

/// In-memory account store keyed by username.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: DashMap<String, Account>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn list(&self) -> Result<Vec<Account>, AppError> {
        let mut accounts: Vec<Account> =
            self.accounts.iter().map(|e| e.value().clone()).collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(accounts)
    }

    async fn get(&self, username: &str) -> Result<Account, AppError> {
        self.accounts
            .get(username)
            .map(|e| e.value().clone())
            .ok_or(AppError::AccountDoesNotExist)
    }

    async fn save(&self, account: Account) -> Result<(), AppError> {
        use dashmap::mapref::entry::Entry;
        match self.accounts.entry(account.username.clone()) {
            Entry::Occupied(_) => Err(AppError::AccountExists),
            Entry::Vacant(slot) => {
                slot.insert(account);
                Ok(())
            }
        }
    }

    async fn update(&self, account: Account) -> Result<(), AppError> {
        match self.accounts.get_mut(&account.username) {
            Some(mut existing) => {
                *existing = account;
                Ok(())
            }
            None => Err(AppError::AccountDoesNotExist),
        }
    }

    async fn delete(&self, username: &str) -> Result<(), AppError> {
        self.accounts
            .remove(username)
            .map(|_| ())
            .ok_or(AppError::AccountDoesNotExist)
    }
}

/// In-memory append-only event log.
#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, event: Event) -> Result<(), AppError> {
        self.events.write().push(event);
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Event>, AppError> {
        let events = self.events.read();
        Ok(events.iter().rev().take(limit).cloned().collect())
    }

    async fn purge(&self) -> Result<(), AppError> {
        self.events.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(username: &str) -> Account {
        Account::new(username, vec!["admin".to_string()])
    }

    #[tokio::test]
    async fn get_missing_account_signals_does_not_exist() {
        let store = MemoryAccountStore::new();
        assert!(matches!(
            store.get("ghost").await,
            Err(AppError::AccountDoesNotExist)
        ));
    }

    #[tokio::test]
    async fn duplicate_save_signals_exists() {
        let store = MemoryAccountStore::new();
        store.save(account("admin")).await.unwrap();
        assert!(matches!(
            store.save(account("admin")).await,
            Err(AppError::AccountExists)
        ));
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let store = MemoryAccountStore::new();
        store.save(account("admin")).await.unwrap();

        let mut changed = account("admin");
        changed.roles = vec!["readonly".to_string()];
        store.update(changed).await.unwrap();
        assert_eq!(store.get("admin").await.unwrap().roles, vec!["readonly"]);

        store.delete("admin").await.unwrap();
        assert!(matches!(
            store.delete("admin").await,
            Err(AppError::AccountDoesNotExist)
        ));
    }

    #[tokio::test]
    async fn list_is_sorted_by_username() {
        let store = MemoryAccountStore::new();
        store.save(account("zed")).await.unwrap();
        store.save(account("amy")).await.unwrap();
        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.username)
            .collect();
        assert_eq!(names, vec!["amy", "zed"]);
    }

    #[tokio::test]
    async fn event_log_lists_newest_first_and_purges() {
        let store = MemoryEventStore::new();
        for i in 0..3 {
            store
                .append(Event {
                    event_type: "api".to_string(),
                    time: Utc::now(),
                    message: format!("event {i}"),
                    username: "admin".to_string(),
                    tags: vec![],
                })
                .await
                .unwrap();
        }

        let events = store.list(2).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "event 2");

        store.purge().await.unwrap();
        assert!(store.list(10).await.unwrap().is_empty());
    }
}

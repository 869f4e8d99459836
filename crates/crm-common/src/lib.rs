// ============================
// crm-common/src/lib.rs
// ============================
//! Shared data types for the CRM controller.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record. `username` is the unique key across the account store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    /// Stored scrypt PHC hash; elided from serialized output when blank so
    /// account listings never echo credential material.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Account {
    pub fn new(username: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            username: username.into(),
            password: String::new(),
            roles,
        }
    }
}

/// Opaque credential issued per successful login, bound to a username and
/// the requesting client's user-agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthToken {
    pub token: String,
    pub username: String,
    pub user_agent: String,
}

/// Named access level. The default set is fixed and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acl {
    pub role_name: String,
    pub description: String,
}

/// Audit record, append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub time: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Transient login / change-password payload. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

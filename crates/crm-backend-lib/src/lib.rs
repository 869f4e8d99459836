// ============================
// crm-backend-lib/src/lib.rs
// ============================
//! Core library for the CRM controller: manager façade, auth pipeline,
//! middleware chain and HTTP API.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod manager;
pub mod middleware;
pub mod store;

use regex::Regex;
use std::sync::Arc;

use crate::config::Settings;
use crate::manager::Manager;

/// Application state shared across all handlers and middleware stages.
pub struct AppState<M> {
    /// Manager façade
    pub manager: Arc<M>,
    /// Loaded settings
    pub settings: Settings,
    /// Compiled audit exclude patterns
    pub audit_excludes: Vec<Regex>,
}

impl<M: Manager> AppState<M> {
    /// Build the shared state, compiling the audit exclude patterns up front
    /// so a bad pattern is a startup error rather than a per-request one.
    pub fn new(manager: Arc<M>, settings: Settings) -> anyhow::Result<Self> {
        let audit_excludes = settings
            .audit
            .excludes
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            manager,
            settings,
            audit_excludes,
        })
    }
}

// ============================
// crm-backend-bin/src/main.rs
// ============================
//! CLI entry point for the CRM controller.
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crm_backend_lib::{
    api::create_router,
    auth::{BuiltinAuthenticator, SessionManager},
    config::Settings,
    manager::{DefaultManager, Manager},
    store::{MemoryAccountStore, MemoryEventStore},
    AppState,
};
use crm_common::Account;

#[derive(Parser)]
#[command(name = "crm-controller", about = "multi-tenant CRM admin controller", version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the controller
    Server {
        /// Listen address (overrides the config file; defaults to :5525)
        #[arg(short, long)]
        listen: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Command::Server { listen } => serve(listen).await,
    }
}

async fn serve(listen_flag: Option<String>) -> anyhow::Result<()> {
    let mut settings = Settings::load().context("loading configuration")?;
    apply_listen_flag(&mut settings, listen_flag);

    let sessions = SessionManager::new(
        Duration::from_secs(settings.session.ttl_secs),
        Duration::from_secs(settings.session.gc_lifetime_secs),
    );

    if settings.auth.provider == "ldap" {
        // an LDAP directory collaborator is wired by embedders; the shipped
        // binary always verifies against the local account store
        tracing::warn!("ldap provider configured but no directory is wired, using builtin auth");
    }
    let authenticator = Arc::new(BuiltinAuthenticator);

    let accounts = Arc::new(MemoryAccountStore::new());
    let events = Arc::new(MemoryEventStore::new());
    let manager = Arc::new(DefaultManager::new(
        authenticator,
        sessions,
        accounts,
        events,
    ));

    seed_admin_if_configured(&settings, manager.as_ref()).await?;

    let addr = settings.listen_addr();
    let state = Arc::new(AppState::new(manager, settings).context("building application state")?);
    let app = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

/// An explicitly supplied `--listen` always wins over the config file.
fn apply_listen_flag(settings: &mut Settings, listen_flag: Option<String>) {
    if let Some(listen) = listen_flag {
        settings.server.listen = listen;
    }
}

/// Create the initial admin account when configured and the store is empty,
/// so a fresh deployment has a way in.
async fn seed_admin_if_configured(
    settings: &Settings,
    manager: &DefaultManager,
) -> anyhow::Result<()> {
    let password = &settings.auth.initial_admin_password;
    if password.is_empty() {
        return Ok(());
    }
    if !manager.accounts().await?.is_empty() {
        return Ok(());
    }

    let mut admin = Account::new("admin", vec!["admin".to_string()]);
    admin.password = password.clone();
    manager.save_account(admin).await?;
    tracing::warn!("seeded initial admin account, change its password");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_listen_flag_overrides_config() {
        let mut settings = Settings::default();
        settings.server.listen = "127.0.0.1:9000".to_string();

        // an explicit flag wins, even when it matches the built-in default
        apply_listen_flag(&mut settings, Some(":5525".to_string()));
        assert_eq!(settings.server.listen, ":5525");
    }

    #[test]
    fn absent_listen_flag_keeps_config_value() {
        let mut settings = Settings::default();
        settings.server.listen = "127.0.0.1:9000".to_string();

        apply_listen_flag(&mut settings, None);
        assert_eq!(settings.server.listen, "127.0.0.1:9000");
    }
}

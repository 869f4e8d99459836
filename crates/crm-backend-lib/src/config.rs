// ============================
// crm-backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub session: SessionSettings,
    pub auth: AuthSettings,
    pub audit: AuditSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address, `host:port`. A bare `:port` binds all interfaces.
    pub listen: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Auth-token lifetime in seconds
    pub ttl_secs: u64,
    /// Interval between expired-session sweeps
    pub gc_lifetime_secs: u64,
}

/// Authenticator selection and LDAP provisioning policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// "builtin" or "ldap"
    pub provider: String,
    pub ldap_autocreate_users: bool,
    pub ldap_default_access_level: String,
    /// When non-empty, an "admin" account with this password is created at
    /// startup if the account store is empty.
    pub initial_admin_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// Regex patterns; a request path matching any of them is not audited.
    pub excludes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            session: SessionSettings::default(),
            auth: AuthSettings::default(),
            audit: AuditSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: ":5525".to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 60 * 60 * 24, // 24 hours
            gc_lifetime_secs: 3600,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            provider: "builtin".to_string(),
            ldap_autocreate_users: false,
            ldap_default_access_level: "readonly".to_string(),
            initial_admin_password: String::new(),
        }
    }
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            excludes: vec!["/networks".to_string(), "/images/json".to_string()],
        }
    }
}

impl Settings {
    /// Load settings by layering the config file under environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from("config/config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("CRM_").split("__"))
            .extract()?;
        Ok(settings)
    }

    /// Resolve the listen address, expanding a bare `:port` form.
    pub fn listen_addr(&self) -> String {
        if let Some(port) = self.server.listen.strip_prefix(':') {
            format!("0.0.0.0:{port}")
        } else {
            self.server.listen.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.server.listen, ":5525");
        assert_eq!(settings.session.ttl_secs, 60 * 60 * 24);
        assert_eq!(settings.session.gc_lifetime_secs, 3600);
        assert_eq!(settings.auth.provider, "builtin");
        assert_eq!(settings.auth.ldap_default_access_level, "readonly");
        assert_eq!(
            settings.audit.excludes,
            vec!["/networks".to_string(), "/images/json".to_string()]
        );
    }

    #[test]
    fn test_listen_addr_expands_bare_port() {
        let settings = Settings::default();
        assert_eq!(settings.listen_addr(), "0.0.0.0:5525");

        let settings = Settings {
            server: ServerSettings {
                listen: "127.0.0.1:9000".to_string(),
            },
            ..Settings::default()
        };
        assert_eq!(settings.listen_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
listen = "127.0.0.1:6000"

[auth]
provider = "ldap"
ldap_autocreate_users = true
"#
        )
        .unwrap();

        let settings = Settings::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.server.listen, "127.0.0.1:6000");
        assert_eq!(settings.auth.provider, "ldap");
        assert!(settings.auth.ldap_autocreate_users);
        // untouched sections keep their defaults
        assert_eq!(settings.session.ttl_secs, 60 * 60 * 24);
    }

    #[test]
    fn test_settings_missing_file_falls_back_to_defaults() {
        let settings = Settings::load_from("does/not/exist.toml").unwrap();
        assert_eq!(settings.server.listen, ":5525");
    }
}

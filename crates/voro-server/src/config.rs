//! Server configuration for Voro.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Mail credentials and the token secret are optional here: a deployment
//! missing them still boots, and the first request that needs them fails
//! with a configuration error.

use std::net::SocketAddr;

use voro_core::mail::SmtpSettings;
use voro_core::rate_limit::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};

/// Default bind address when neither `VORO_BIND_ADDR` nor `PORT` is set.
const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Public site origin used in intake links (e.g., `https://voro.ink`).
    /// Derived from the request when unset.
    pub public_origin: Option<String>,
    /// Brand name used in page and message copy.
    pub brand: String,
    /// Symmetric secret for intake tokens.
    pub token_secret: Option<String>,
    /// SMTP relay settings (None when credentials are missing).
    pub smtp: Option<SmtpSettings>,
    /// Default sender mailbox.
    pub mail_from: Option<String>,
    /// Owner address for notifications and digests.
    pub mail_to: Option<String>,
    /// Inquiries allowed per source per window.
    pub rate_limit_max: u32,
    /// Rate-limit window length in seconds.
    pub rate_limit_window_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `VORO_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:3000`)
    /// - `PORT` — port to bind on, binds to `0.0.0.0`
    /// - `VORO_LOG_LEVEL` — log filter (default: `info`)
    /// - `VORO_PUBLIC_ORIGIN` — origin for intake links (default: request origin)
    /// - `VORO_BRAND` — brand name (default: `Voro`)
    /// - `TOKEN_SECRET` — intake token signing secret
    /// - `SMTP_HOST` / `SMTP_PORT` — relay (default: `smtp.gmail.com:465`)
    /// - `GMAIL_USER` or `SMTP_USER` — SMTP account
    /// - `GMAIL_PASS`, `GMAIL_APP_PASSWORD`, or `SMTP_PASS` — SMTP password
    /// - `MAIL_FROM` — sender mailbox (default: `{brand} <{user}>`)
    /// - `MAIL_TO` or `NOTIFY_TO_EMAIL` — owner address (default: SMTP account)
    /// - `VORO_RATE_LIMIT` — inquiries per window per source (default: `12`)
    /// - `VORO_RATE_WINDOW_SECS` — window length (default: `60`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|k| var(k));

        // Priority: VORO_BIND_ADDR > PORT > default 127.0.0.1:3000
        let bind_addr = if let Some(addr) = var("VORO_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(DEFAULT_BIND))
        } else if let Some(port_str) = var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(DEFAULT_BIND.1);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(DEFAULT_BIND)
        };

        let log_level = var("VORO_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let public_origin = var("VORO_PUBLIC_ORIGIN")
            .map(|origin| origin.trim().trim_end_matches('/').to_owned());

        let brand = var("VORO_BRAND").unwrap_or_else(|| "Voro".to_owned());

        let token_secret = var("TOKEN_SECRET");

        let smtp_user = first(&["GMAIL_USER", "SMTP_USER"]);
        let smtp_pass = first(&["GMAIL_PASS", "GMAIL_APP_PASSWORD", "SMTP_PASS"]);
        let smtp = match (&smtp_user, smtp_pass) {
            (Some(username), Some(password)) => Some(SmtpSettings {
                host: var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_owned()),
                port: var("SMTP_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(465),
                username: username.clone(),
                password,
            }),
            _ => None,
        };

        let mail_from = var("MAIL_FROM").or_else(|| {
            smtp_user
                .as_ref()
                .map(|user| format!("{brand} <{user}>"))
        });

        let mail_to = first(&["MAIL_TO", "NOTIFY_TO_EMAIL"]).or_else(|| smtp_user.clone());

        let rate_limit_max = var("VORO_RATE_LIMIT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_REQUESTS);

        let rate_limit_window_secs = var("VORO_RATE_WINDOW_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_WINDOW.as_secs());

        Self {
            bind_addr,
            log_level,
            public_origin,
            brand,
            token_secret,
            smtp,
            mail_from,
            mail_to,
            rate_limit_max,
            rate_limit_window_secs,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("public_origin", &self.public_origin)
            .field("brand", &self.brand)
            .field("token_secret", &self.token_secret.as_ref().map(|_| "[redacted]"))
            .field("smtp", &self.smtp)
            .field("mail_from", &self.mail_from)
            .field("mail_to", &self.mail_to)
            .field("rate_limit_max", &self.rate_limit_max)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = load(&[]);
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.brand, "Voro");
        assert!(config.public_origin.is_none());
        assert!(config.token_secret.is_none());
        assert!(config.smtp.is_none());
        assert!(config.mail_from.is_none());
        assert!(config.mail_to.is_none());
        assert_eq!(config.rate_limit_max, 12);
        assert_eq!(config.rate_limit_window_secs, 60);
    }

    #[test]
    fn port_binds_all_interfaces_and_bind_addr_wins() {
        let config = load(&[("PORT", "8080")]);
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());

        let config = load(&[("PORT", "8080"), ("VORO_BIND_ADDR", "127.0.0.1:9000")]);
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn gmail_credentials_derive_sender_and_owner() {
        let config = load(&[
            ("GMAIL_USER", "reed@gmail.com"),
            ("GMAIL_APP_PASSWORD", "app-pass"),
        ]);
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.username, "reed@gmail.com");
        assert_eq!(smtp.password, "app-pass");
        assert_eq!(config.mail_from.as_deref(), Some("Voro <reed@gmail.com>"));
        assert_eq!(config.mail_to.as_deref(), Some("reed@gmail.com"));
    }

    #[test]
    fn explicit_mail_addresses_override_defaults() {
        let config = load(&[
            ("SMTP_USER", "relay@voro.ink"),
            ("SMTP_PASS", "pw"),
            ("SMTP_HOST", "smtp.voro.ink"),
            ("SMTP_PORT", "587"),
            ("MAIL_FROM", "Hello <hello@voro.ink>"),
            ("NOTIFY_TO_EMAIL", "owner@voro.ink"),
        ]);
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.voro.ink");
        assert_eq!(smtp.port, 587);
        assert_eq!(config.mail_from.as_deref(), Some("Hello <hello@voro.ink>"));
        assert_eq!(config.mail_to.as_deref(), Some("owner@voro.ink"));
    }

    #[test]
    fn password_without_user_disables_smtp() {
        let config = load(&[("GMAIL_PASS", "pw")]);
        assert!(config.smtp.is_none());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = load(&[("TOKEN_SECRET", ""), ("VORO_BRAND", "  ")]);
        assert!(config.token_secret.is_none());
        assert_eq!(config.brand, "Voro");
    }

    #[test]
    fn public_origin_drops_trailing_slash() {
        let config = load(&[("VORO_PUBLIC_ORIGIN", "https://voro.ink/")]);
        assert_eq!(config.public_origin.as_deref(), Some("https://voro.ink"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&[
            ("TOKEN_SECRET", "super-secret"),
            ("GMAIL_USER", "reed@gmail.com"),
            ("GMAIL_PASS", "hunter2"),
        ]);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("hunter2"));
    }
}

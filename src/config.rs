// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | HMAC secret for session tokens (≥ 32 bytes) | Required |
//! | `APP_ENV` | `development` disables `Secure` cookies | `production` |
//! | `HOST` | Server bind IP address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `ACCESS_TOKEN_TTL_DAYS` | Access token lifetime (1 to 3650) | `7` |
//! | `REFRESH_TOKEN_TTL_DAYS` | Refresh token lifetime (1 to 3650) | `30` |
//! | `ROLLING_REFRESH` | Rotate the refresh token on refresh | `true` |
//! | `AUTH_ALLOW_BEARER` | Accept `Authorization: Bearer` when no cookie | `true` |
//! | `CORS_ALLOWED_ORIGINS` | Comma-separated origins allowed with credentials | Unset |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; serve HTTPS when both set | Unset |
//! | `SEED_SUPERADMIN_EMAIL` / `SEED_SUPERADMIN_PASSWORD` | Bootstrap account | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const APP_ENV_ENV: &str = "APP_ENV";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const ACCESS_TOKEN_TTL_DAYS_ENV: &str = "ACCESS_TOKEN_TTL_DAYS";
pub const REFRESH_TOKEN_TTL_DAYS_ENV: &str = "REFRESH_TOKEN_TTL_DAYS";
pub const ROLLING_REFRESH_ENV: &str = "ROLLING_REFRESH";
pub const AUTH_ALLOW_BEARER_ENV: &str = "AUTH_ALLOW_BEARER";
pub const CORS_ALLOWED_ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const SEED_SUPERADMIN_EMAIL_ENV: &str = "SEED_SUPERADMIN_EMAIL";
pub const SEED_SUPERADMIN_PASSWORD_ENV: &str = "SEED_SUPERADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Shortest accepted `JWT_SECRET`, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime, in days.
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("JWT_SECRET must be at least 32 bytes")]
    WeakSecret,
    #[error("{name}: invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    PartialTls,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// PEM certificate chain and key for HTTPS.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: String,
    pub key: String,
}

/// Bootstrap superadmin account created at startup.
#[derive(Clone)]
pub struct SeedAccount {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub environment: Environment,
    pub bind_addr: SocketAddr,
    pub access_token_ttl_days: i64,
    pub refresh_token_ttl_days: i64,
    pub rolling_refresh: bool,
    pub allow_bearer: bool,
    pub cors_allowed_origins: Vec<String>,
    pub tls: Option<TlsPaths>,
    pub seed_superadmin: Option<SeedAccount>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        let environment = match get(APP_ENV_ENV).as_deref().map(str::to_lowercase).as_deref() {
            None | Some("production") | Some("prod") => Environment::Production,
            Some("development") | Some("dev") | Some("local") => Environment::Development,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: APP_ENV_ENV,
                    value: other.to_string(),
                })
            }
        };

        let access_token_ttl_days = parse_or(&get, ACCESS_TOKEN_TTL_DAYS_ENV, 7i64)?;
        let refresh_token_ttl_days = parse_or(&get, REFRESH_TOKEN_TTL_DAYS_ENV, 30i64)?;
        for (name, days) in [
            (ACCESS_TOKEN_TTL_DAYS_ENV, access_token_ttl_days),
            (REFRESH_TOKEN_TTL_DAYS_ENV, refresh_token_ttl_days),
        ] {
            if !(1..=MAX_TOKEN_TTL_DAYS).contains(&days) {
                return Err(ConfigError::Invalid {
                    name,
                    value: days.to_string(),
                });
            }
        }

        let host = get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&get, PORT_ENV, 8080u16)?;
        let bind_addr = match host.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, port),
            Err(_) => {
                return Err(ConfigError::Invalid {
                    name: HOST_ENV,
                    value: host,
                })
            }
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths { cert, key }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialTls),
        };

        let seed_superadmin = match (get(SEED_SUPERADMIN_EMAIL_ENV), get(SEED_SUPERADMIN_PASSWORD_ENV)) {
            (Some(email), Some(password)) => Some(SeedAccount { email, password }),
            _ => None,
        };

        Ok(Self {
            jwt_secret,
            environment,
            bind_addr,
            access_token_ttl_days,
            refresh_token_ttl_days,
            rolling_refresh: parse_bool_or(&get, ROLLING_REFRESH_ENV, true)?,
            allow_bearer: parse_bool_or(&get, AUTH_ALLOW_BEARER_ENV, true)?,
            cors_allowed_origins: get(CORS_ALLOWED_ORIGINS_ENV)
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            tls,
            seed_superadmin,
        })
    }

    /// `Secure` cookies everywhere except local development.
    pub fn secure_cookies(&self) -> bool {
        self.environment != Environment::Development
    }
}

fn parse_or<G, T>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

fn parse_bool_or<G>(get: &G, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name).as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(default),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            name,
            value: other.to_string(),
        }),
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{CookieSettings, TokenCodec, TokenSource};
use crate::config::AppConfig;
use crate::store::InMemoryStore;

/// Authentication configuration shared by the guard, gates and refresh flow.
pub struct AuthConfig {
    pub codec: TokenCodec,
    pub cookies: CookieSettings,
    /// Where the guard looks for the access token
    pub token_source: TokenSource,
    /// Issue a fresh refresh token on every refresh
    pub rolling_refresh: bool,
}

impl AuthConfig {
    /// Default policy: 7/30-day tokens, cookie-first with bearer fallback,
    /// rolling refresh.
    pub fn new(secret: &[u8], secure_cookies: bool) -> Self {
        Self {
            codec: TokenCodec::new(secret),
            cookies: CookieSettings::new(secure_cookies),
            token_source: TokenSource::CookieThenBearer,
            rolling_refresh: true,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let access = chrono::Duration::days(config.access_token_ttl_days);
        let refresh = chrono::Duration::days(config.refresh_token_ttl_days);

        Self {
            codec: TokenCodec::new(config.jwt_secret.as_bytes()).with_ttls(access, refresh),
            cookies: CookieSettings::new(config.secure_cookies()).with_max_ages(
                time::Duration::days(config.access_token_ttl_days),
                time::Duration::days(config.refresh_token_ttl_days),
            ),
            token_source: if config.allow_bearer {
                TokenSource::CookieThenBearer
            } else {
                TokenSource::CookieOnly
            },
            rolling_refresh: config.rolling_refresh,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthConfig>,
    pub store: Arc<RwLock<InMemoryStore>>,
}

impl AppState {
    pub fn new(auth: AuthConfig, store: InMemoryStore) -> Self {
        Self {
            auth: Arc::new(auth),
            store: Arc::new(RwLock::new(store)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) const TEST_SECRET: &[u8] = b"unit-test-secret-that-is-long-enough";

    /// State with development cookies and an empty store.
    pub(crate) fn test_state() -> AppState {
        AppState::new(AuthConfig::new(TEST_SECRET, false), InMemoryStore::new())
    }
}

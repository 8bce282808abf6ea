// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session lifecycle: start (login/registration), refresh, end (logout).
//!
//! ```text
//! Anonymous --login/register--> Authenticated --access expiry--> Expired
//! Expired --refresh ok--> Authenticated
//! Expired --refresh fails--> Anonymous (cookies cleared)
//! Authenticated --logout--> Anonymous (cookies cleared)
//! ```
//!
//! Token pairs are only minted here. Refresh tokens are not single-use, so two
//! concurrent refreshes both succeed with independent, valid pairs.

use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use super::{cookies, AuthError, ClaimSet, Identity, TokenKind};
use crate::state::AuthConfig;

/// Freshly minted session tokens.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// A session that was started or extended, with the cookies to send back.
pub struct IssuedSession {
    pub jar: CookieJar,
    pub tokens: TokenPair,
    pub identity: Identity,
}

/// A refresh that did not produce a session.
///
/// `jar` already has the session cookies expired when the refresh token was
/// present but unusable.
pub struct RefreshFailed {
    pub jar: CookieJar,
    pub reason: AuthError,
}

impl IntoResponse for RefreshFailed {
    fn into_response(self) -> Response {
        (self.jar, self.reason).into_response()
    }
}

fn identity_for(claims: &ClaimSet) -> Identity {
    Identity {
        user_id: claims.user_id.clone(),
        email: claims.email.clone(),
        role: claims.role.unwrap_or_default(),
    }
}

/// Mint a token pair for a freshly authenticated user and set both cookies.
pub fn start_session(
    jar: CookieJar,
    auth: &AuthConfig,
    claims: &ClaimSet,
) -> Result<IssuedSession, AuthError> {
    let tokens = TokenPair {
        access_token: auth.codec.mint(claims, TokenKind::Access)?,
        refresh_token: auth.codec.mint(claims, TokenKind::Refresh)?,
    };
    let jar = cookies::set_session_cookies(
        jar,
        &auth.cookies,
        &tokens.access_token,
        &tokens.refresh_token,
    );

    Ok(IssuedSession {
        jar,
        tokens,
        identity: identity_for(claims),
    })
}

/// Extend a session from the `refresh_token` cookie.
///
/// `current` maps the verified refresh claims to the claims the new tokens
/// should carry, so role and email changes take effect here. Returning
/// `None` means the account is gone and the refresh token is treated as
/// invalid.
///
/// - no refresh cookie: fails, cookies untouched
/// - invalid or expired refresh token, or unknown account: fails, both
///   cookies cleared
/// - otherwise: new access token; with rolling refresh a new refresh token
///   too, else the old one is re-set with its remaining lifetime
pub fn refresh<F>(
    jar: CookieJar,
    auth: &AuthConfig,
    current: F,
) -> Result<IssuedSession, RefreshFailed>
where
    F: FnOnce(&ClaimSet) -> Option<ClaimSet>,
{
    let Some(token) = cookies::refresh_token(&jar) else {
        return Err(RefreshFailed {
            jar,
            reason: AuthError::MissingToken,
        });
    };

    let claims = match auth.codec.verify(&token, TokenKind::Refresh) {
        Ok(claims) => claims,
        Err(reason) => {
            return Err(RefreshFailed {
                jar: cookies::clear_session_cookies(jar, &auth.cookies),
                reason,
            });
        }
    };
    let Some(claim_set) = current(&claims.claim_set()) else {
        return Err(RefreshFailed {
            jar: cookies::clear_session_cookies(jar, &auth.cookies),
            reason: AuthError::InvalidToken,
        });
    };

    let access_token = match auth.codec.mint(&claim_set, TokenKind::Access) {
        Ok(token) => token,
        Err(reason) => return Err(RefreshFailed { jar, reason }),
    };

    let (jar, refresh_token) = if auth.rolling_refresh {
        let refresh_token = match auth.codec.mint(&claim_set, TokenKind::Refresh) {
            Ok(token) => token,
            Err(reason) => return Err(RefreshFailed { jar, reason }),
        };
        let jar = cookies::set_session_cookies(jar, &auth.cookies, &access_token, &refresh_token);
        (jar, refresh_token)
    } else {
        let remaining = time::Duration::seconds(claims.exp - Utc::now().timestamp());
        let jar = cookies::set_session_cookies_with_refresh_age(
            jar,
            &auth.cookies,
            &access_token,
            &token,
            remaining,
        );
        (jar, token)
    };

    Ok(IssuedSession {
        jar,
        tokens: TokenPair {
            access_token,
            refresh_token,
        },
        identity: identity_for(&claim_set),
    })
}

/// Clear the session cookies. Tokens already issued stay valid until expiry.
pub fn end_session(jar: CookieJar, auth: &AuthConfig) -> CookieJar {
    cookies::clear_session_cookies(jar, &auth.cookies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::cookies::tests::set_cookie_headers;
    use crate::auth::{Role, ACCESS_COOKIE, REFRESH_COOKIE};
    use crate::state::test_support::TEST_SECRET;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};

    fn auth() -> AuthConfig {
        AuthConfig::new(TEST_SECRET, false)
    }

    fn jar_with(cookies: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(cookies).unwrap());
        CookieJar::from_headers(&headers)
    }

    fn claims() -> ClaimSet {
        ClaimSet::new("u1", "a@b.com", Role::User)
    }

    fn unchanged(claims: &ClaimSet) -> Option<ClaimSet> {
        Some(claims.clone())
    }

    fn max_age(cookie: &str) -> i64 {
        cookie
            .split(';')
            .find_map(|part| part.trim().strip_prefix("Max-Age="))
            .and_then(|v| v.parse().ok())
            .unwrap()
    }

    #[test]
    fn start_session_sets_both_cookies() {
        let auth = auth();
        let session = start_session(CookieJar::new(), &auth, &claims()).unwrap();
        assert_eq!(session.identity.user_id, "u1");

        let headers = set_cookie_headers(session.jar);
        assert!(headers
            .iter()
            .any(|h| h.starts_with(&format!("{ACCESS_COOKIE}={}", session.tokens.access_token))));
        assert!(headers
            .iter()
            .any(|h| h.starts_with(&format!("{REFRESH_COOKIE}={}", session.tokens.refresh_token))));
    }

    #[test]
    fn refresh_without_cookie_fails_cleanly() {
        let auth = auth();
        let failed = refresh(CookieJar::new(), &auth, unchanged).err().expect("refresh should fail");
        assert!(matches!(failed.reason, AuthError::MissingToken));
        assert!(set_cookie_headers(failed.jar).is_empty());
    }

    #[test]
    fn refresh_with_invalid_token_clears_cookies() {
        let auth = auth();
        let failed = refresh(jar_with("auth_token=old; refresh_token=bogus"), &auth, unchanged)
            .err()
            .expect("refresh should fail");
        assert!(matches!(failed.reason, AuthError::InvalidToken));

        let headers = set_cookie_headers(failed.jar);
        assert_eq!(headers.len(), 2);
        assert!(headers.iter().all(|h| h.contains("Max-Age=0")));
    }

    #[test]
    fn refresh_with_expired_token_clears_cookies() {
        let auth = auth();
        let expired = auth
            .codec
            .mint_with_ttl(&claims(), TokenKind::Refresh, chrono::Duration::seconds(-1))
            .unwrap();
        let failed = refresh(jar_with(&format!("refresh_token={expired}")), &auth, unchanged)
            .err()
            .expect("refresh should fail");
        assert!(matches!(failed.reason, AuthError::ExpiredToken));
        assert_eq!(set_cookie_headers(failed.jar).len(), 2);
    }

    #[test]
    fn access_token_cannot_be_used_to_refresh() {
        let auth = auth();
        let access = auth.codec.mint(&claims(), TokenKind::Access).unwrap();
        let failed = refresh(jar_with(&format!("refresh_token={access}")), &auth, unchanged)
            .err()
            .expect("refresh should fail");
        assert!(matches!(failed.reason, AuthError::InvalidToken));
    }

    #[test]
    fn refresh_mints_new_access_token_for_same_user() {
        let auth = auth();
        let started = start_session(CookieJar::new(), &auth, &claims()).unwrap();
        let jar = jar_with(&format!(
            "auth_token={}; refresh_token={}",
            started.tokens.access_token, started.tokens.refresh_token
        ));

        let refreshed = refresh(jar, &auth, unchanged).ok().expect("refresh should succeed");
        assert_ne!(refreshed.tokens.access_token, started.tokens.access_token);

        let decoded = auth
            .codec
            .verify(&refreshed.tokens.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(decoded.user_id, "u1");
        assert_eq!(decoded.email, "a@b.com");
        assert_eq!(decoded.role, Some(Role::User));
    }

    #[test]
    fn rolling_refresh_rotates_refresh_token() {
        let auth = auth();
        let old = auth.codec.mint(&claims(), TokenKind::Refresh).unwrap();
        let refreshed = refresh(jar_with(&format!("refresh_token={old}")), &auth, unchanged)
            .ok()
            .expect("refresh should succeed");
        assert_ne!(refreshed.tokens.refresh_token, old);

        let headers = set_cookie_headers(refreshed.jar);
        assert_eq!(headers.len(), 2);
        assert!(headers
            .iter()
            .any(|h| h.starts_with("refresh_token=") && h.contains("Max-Age=2592000")));
    }

    #[test]
    fn fixed_refresh_reuses_token_with_remaining_lifetime() {
        let mut auth = auth();
        auth.rolling_refresh = false;
        let old = auth
            .codec
            .mint_with_ttl(&claims(), TokenKind::Refresh, chrono::Duration::days(2))
            .unwrap();

        let refreshed = refresh(jar_with(&format!("refresh_token={old}")), &auth, unchanged)
            .ok()
            .expect("refresh should succeed");
        assert_eq!(refreshed.tokens.refresh_token, old);

        let headers = set_cookie_headers(refreshed.jar);
        let cookie = headers
            .iter()
            .find(|h| h.starts_with("refresh_token="))
            .unwrap();
        let remaining = max_age(cookie);
        assert!((172_790..=172_800).contains(&remaining), "Max-Age was {remaining}");
    }

    #[test]
    fn refresh_uses_current_account_claims() {
        let auth = auth();
        let token = auth
            .codec
            .mint(&ClaimSet::new("u1", "a@b.com", Role::Admin), TokenKind::Refresh)
            .unwrap();

        let refreshed = refresh(jar_with(&format!("refresh_token={token}")), &auth, |old| {
            assert_eq!(old.role, Some(Role::Admin));
            Some(ClaimSet::new("u1", "new@b.com", Role::User))
        })
        .ok()
        .expect("refresh should succeed");
        assert_eq!(refreshed.identity.role, Role::User);

        let access = auth
            .codec
            .verify(&refreshed.tokens.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(access.role, Some(Role::User));
        assert_eq!(access.email, "new@b.com");

        let rotated = auth
            .codec
            .verify(&refreshed.tokens.refresh_token, TokenKind::Refresh)
            .unwrap();
        assert_eq!(rotated.role, Some(Role::User));
    }

    #[test]
    fn refresh_for_deleted_account_clears_cookies() {
        let auth = auth();
        let token = auth.codec.mint(&claims(), TokenKind::Refresh).unwrap();
        let failed = refresh(jar_with(&format!("refresh_token={token}")), &auth, |_| None)
            .err()
            .expect("refresh should fail");
        assert!(matches!(failed.reason, AuthError::InvalidToken));

        let headers = set_cookie_headers(failed.jar);
        assert_eq!(headers.len(), 2);
        assert!(headers.iter().all(|h| h.contains("Max-Age=0")));
    }

    #[test]
    fn concurrent_refreshes_both_succeed() {
        let auth = auth();
        let token = auth.codec.mint(&claims(), TokenKind::Refresh).unwrap();
        let a = refresh(jar_with(&format!("refresh_token={token}")), &auth, unchanged);
        let b = refresh(jar_with(&format!("refresh_token={token}")), &auth, unchanged);
        let (a, b) = (a.ok().unwrap(), b.ok().unwrap());
        assert_ne!(a.tokens.access_token, b.tokens.access_token);
        assert!(auth.codec.verify(&a.tokens.access_token, TokenKind::Access).is_ok());
        assert!(auth.codec.verify(&b.tokens.access_token, TokenKind::Access).is_ok());
    }

    #[test]
    fn refresh_failure_renders_401() {
        let auth = auth();
        let failed = refresh(jar_with("refresh_token=bogus"), &auth, unchanged).err().unwrap();
        let response = failed.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
    }

    #[test]
    fn end_session_expires_cookies() {
        let auth = auth();
        let headers = set_cookie_headers(end_session(jar_with("auth_token=x"), &auth));
        assert_eq!(headers.len(), 2);
    }
}

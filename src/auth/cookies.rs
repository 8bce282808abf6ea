// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cookies.
//!
//! The session is the pair of cookies below; there is no server-side table.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use super::codec::{ACCESS_TOKEN_TTL_DAYS, REFRESH_TOKEN_TTL_DAYS};

/// Cookie holding the access token.
pub const ACCESS_COOKIE: &str = "auth_token";

/// Cookie holding the refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Security attributes and lifetimes for the session cookies.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// `Secure` attribute; off only in local development
    pub secure: bool,
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
}

impl CookieSettings {
    pub fn new(secure: bool) -> Self {
        Self {
            secure,
            access_max_age: Duration::days(ACCESS_TOKEN_TTL_DAYS),
            refresh_max_age: Duration::days(REFRESH_TOKEN_TTL_DAYS),
        }
    }

    pub fn with_max_ages(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_max_age = access;
        self.refresh_max_age = refresh;
        self
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self::new(true)
    }
}

fn session_cookie(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    session_cookie(name, String::new(), Duration::ZERO, secure)
}

/// Write both session cookies with the configured lifetimes.
pub fn set_session_cookies(
    jar: CookieJar,
    settings: &CookieSettings,
    access_token: &str,
    refresh_token: &str,
) -> CookieJar {
    set_session_cookies_with_refresh_age(
        jar,
        settings,
        access_token,
        refresh_token,
        settings.refresh_max_age,
    )
}

/// Write both session cookies, giving the refresh cookie an explicit max-age.
///
/// Used when an existing refresh token is re-issued so the cookie does not
/// outlive the token inside it.
pub fn set_session_cookies_with_refresh_age(
    jar: CookieJar,
    settings: &CookieSettings,
    access_token: &str,
    refresh_token: &str,
    refresh_max_age: Duration,
) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_COOKIE,
        access_token.to_string(),
        settings.access_max_age,
        settings.secure,
    ))
    .add(session_cookie(
        REFRESH_COOKIE,
        refresh_token.to_string(),
        refresh_max_age,
        settings.secure,
    ))
}

/// Expire both session cookies.
///
/// Always emits `Set-Cookie` for both names, whether or not the request
/// carried them.
pub fn clear_session_cookies(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(expired_cookie(ACCESS_COOKIE, settings.secure))
        .add(expired_cookie(REFRESH_COOKIE, settings.secure))
}

/// Access token from the request cookies, if any.
pub fn access_token(jar: &CookieJar) -> Option<String> {
    non_empty(jar, ACCESS_COOKIE)
}

/// Refresh token from the request cookies, if any.
pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    non_empty(jar, REFRESH_COOKIE)
}

fn non_empty(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{
        http::{header::SET_COOKIE, HeaderMap, HeaderValue},
        response::IntoResponse,
    };

    /// Collect the `Set-Cookie` headers a jar produces.
    pub(crate) fn set_cookie_headers(jar: CookieJar) -> Vec<String> {
        let response = (jar, ()).into_response();
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    fn find<'a>(headers: &'a [String], name: &str) -> &'a str {
        headers
            .iter()
            .find(|h| h.starts_with(&format!("{name}=")))
            .unwrap_or_else(|| panic!("no Set-Cookie for {name}"))
    }

    #[test]
    fn session_cookies_carry_security_attributes() {
        let jar = set_session_cookies(CookieJar::new(), &CookieSettings::new(true), "acc", "ref");
        let headers = set_cookie_headers(jar);
        assert_eq!(headers.len(), 2);

        let access = find(&headers, ACCESS_COOKIE);
        assert!(access.starts_with("auth_token=acc"));
        assert!(access.contains("HttpOnly"));
        assert!(access.contains("Secure"));
        assert!(access.contains("SameSite=Lax"));
        assert!(access.contains("Path=/"));
        assert!(access.contains("Max-Age=604800"));

        let refresh = find(&headers, REFRESH_COOKIE);
        assert!(refresh.starts_with("refresh_token=ref"));
        assert!(refresh.contains("HttpOnly"));
        assert!(refresh.contains("Max-Age=2592000"));
    }

    #[test]
    fn development_cookies_are_not_secure() {
        let jar = set_session_cookies(CookieJar::new(), &CookieSettings::new(false), "acc", "ref");
        for header in set_cookie_headers(jar) {
            assert!(!header.contains("Secure"), "{header}");
            assert!(header.contains("HttpOnly"));
        }
    }

    #[test]
    fn clearing_expires_both_cookies() {
        let jar = clear_session_cookies(CookieJar::new(), &CookieSettings::default());
        let headers = set_cookie_headers(jar);
        assert_eq!(headers.len(), 2);
        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            let header = find(&headers, name);
            assert!(header.contains("Max-Age=0"), "{header}");
            assert!(header.contains("Path=/"));
        }
    }

    #[test]
    fn reads_tokens_from_request_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("auth_token=abc; refresh_token=def; theme=dark"),
        );
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(access_token(&jar).as_deref(), Some("abc"));
        assert_eq!(refresh_token(&jar).as_deref(), Some("def"));
    }

    #[test]
    fn empty_cookie_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("auth_token="));
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(access_token(&jar), None);
        assert_eq!(refresh_token(&jar), None);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request authentication and Axum extractors.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity is Identity
//! }
//! ```
//!
//! Privileged handlers use `AdminOnly` / `SuperAdminOnly`, which authenticate
//! first (401) and then check the role (403).

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;

use super::{
    authorize, cookies, Identity, AuthError, Role, TokenKind, ADMIN_ROLES, SUPERADMIN_ROLES,
};
use crate::state::{AppState, AuthConfig};

/// Where the guard may read the access token from.
///
/// The `auth_token` cookie always wins. With `CookieThenBearer`, an
/// `Authorization: Bearer` header is read only when the cookie is absent; a
/// present but invalid cookie is never second-guessed by the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    CookieOnly,
    CookieThenBearer,
}

/// Locate the access token according to `source`.
pub fn access_token_from_headers(headers: &HeaderMap, source: TokenSource) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(token) = cookies::access_token(&jar) {
        return Some(token);
    }

    match source {
        TokenSource::CookieOnly => None,
        TokenSource::CookieThenBearer => headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    }
}

/// Authenticate a request from its headers.
///
/// `Err` is the unauthenticated branch: [`AuthError::MissingToken`] when no
/// token is present (the ordinary "not logged in" case), otherwise
/// [`AuthError::InvalidToken`] or [`AuthError::ExpiredToken`]. Performs no
/// I/O beyond header inspection.
pub fn authenticate(headers: &HeaderMap, auth: &AuthConfig) -> Result<Identity, AuthError> {
    let token = access_token_from_headers(headers, auth.token_source).ok_or(AuthError::MissingToken)?;
    let claims = auth.codec.verify(&token, TokenKind::Access)?;
    Ok(claims.into_identity())
}

/// Extractor for authenticated callers.
///
/// Rejects with 401 when the request carries no valid access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(Auth(identity): Auth) -> Json<Identity> {
///     Json(identity)
/// }
/// ```
pub struct Auth(pub Identity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the identity
        if let Some(identity) = parts.extensions.get::<Identity>().cloned() {
            return Ok(Auth(identity));
        }

        match authenticate(&parts.headers, &state.auth) {
            Ok(identity) => Ok(Auth(identity)),
            Err(e) => {
                tracing::debug!(reason = %e, path = %parts.uri.path(), "Request not authenticated");
                Err(e)
            }
        }
    }
}

async fn require_roles(
    parts: &mut Parts,
    state: &AppState,
    allowed: &[Role],
) -> Result<Identity, AuthError> {
    let Auth(identity) = Auth::from_request_parts(parts, state).await?;

    if let Err(e) = authorize(&identity, allowed).into_result() {
        tracing::info!(
            user_id = %identity.user_id,
            role = %identity.role,
            path = %parts.uri.path(),
            "Role not permitted"
        );
        return Err(e);
    }

    Ok(identity)
}

/// Extractor that requires the `admin` or `superadmin` role.
pub struct AdminOnly(pub Identity);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_roles(parts, state, ADMIN_ROLES).await.map(AdminOnly)
    }
}

/// Extractor that requires the `superadmin` role.
pub struct SuperAdminOnly(pub Identity);

impl FromRequestParts<AppState> for SuperAdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_roles(parts, state, SUPERADMIN_ROLES).await.map(SuperAdminOnly)
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if no valid authentication is present, instead of rejecting.
pub struct OptionalAuth(pub Option<Identity>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(identity)) => Ok(OptionalAuth(Some(identity))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ClaimSet;
    use crate::state::test_support::test_state;
    use axum::http::Request;

    fn mint(state: &AppState, role: Role) -> String {
        state
            .auth
            .codec
            .mint(&ClaimSet::new("u1", "a@b.com", role), TokenKind::Access)
            .unwrap()
    }

    fn parts_with(header: Option<(&str, String)>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn no_cookie_is_missing_token() {
        let state = test_state();
        let headers = HeaderMap::new();
        assert!(matches!(
            authenticate(&headers, &state.auth),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn fresh_cookie_yields_embedded_identity() {
        let state = test_state();
        let token = mint(&state, Role::User);
        let parts = parts_with(Some(("cookie", format!("auth_token={token}"))));

        let identity = authenticate(&parts.headers, &state.auth).unwrap();
        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.role, Role::User);
    }

    #[test]
    fn garbage_cookie_is_invalid() {
        let state = test_state();
        let parts = parts_with(Some(("cookie", "auth_token=garbage".to_string())));
        assert!(matches!(
            authenticate(&parts.headers, &state.auth),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_cookie_is_expired() {
        let state = test_state();
        let token = state
            .auth
            .codec
            .mint_with_ttl(
                &ClaimSet::new("u1", "a@b.com", Role::User),
                TokenKind::Access,
                chrono::Duration::seconds(-5),
            )
            .unwrap();
        let parts = parts_with(Some(("cookie", format!("auth_token={token}"))));
        assert!(matches!(
            authenticate(&parts.headers, &state.auth),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn bearer_header_is_a_fallback() {
        let state = test_state();
        let token = mint(&state, Role::Admin);
        let parts = parts_with(Some(("authorization", format!("Bearer {token}"))));
        let identity = authenticate(&parts.headers, &state.auth).unwrap();
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn cookie_takes_precedence_over_bearer() {
        let state = test_state();
        let bearer = mint(&state, Role::SuperAdmin);
        let mut parts = parts_with(Some(("cookie", "auth_token=garbage".to_string())));
        parts
            .headers
            .insert(AUTHORIZATION, format!("Bearer {bearer}").parse().unwrap());

        assert!(matches!(
            authenticate(&parts.headers, &state.auth),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn cookie_only_ignores_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(access_token_from_headers(&headers, TokenSource::CookieOnly), None);
        assert_eq!(
            access_token_from_headers(&headers, TokenSource::CookieThenBearer).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn refresh_token_cannot_authenticate() {
        let state = test_state();
        let refresh = state
            .auth
            .codec
            .mint(&ClaimSet::new("u1", "a@b.com", Role::User), TokenKind::Refresh)
            .unwrap();
        let parts = parts_with(Some(("cookie", format!("auth_token={refresh}"))));
        assert!(matches!(
            authenticate(&parts.headers, &state.auth),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let state = test_state();
        let mut parts = parts_with(None);
        parts.extensions.insert(Identity {
            user_id: "from_middleware".to_string(),
            email: "m@b.com".to_string(),
            role: Role::Admin,
        });

        let Auth(identity) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(identity.user_id, "from_middleware");
    }

    #[tokio::test]
    async fn admin_only_distinguishes_401_and_403() {
        let state = test_state();

        let mut anonymous = parts_with(None);
        let result = AdminOnly::from_request_parts(&mut anonymous, &state).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));

        let token = mint(&state, Role::User);
        let mut user = parts_with(Some(("cookie", format!("auth_token={token}"))));
        let result = AdminOnly::from_request_parts(&mut user, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientRole)));

        let token = mint(&state, Role::Admin);
        let mut admin = parts_with(Some(("cookie", format!("auth_token={token}"))));
        assert!(AdminOnly::from_request_parts(&mut admin, &state).await.is_ok());
    }

    #[tokio::test]
    async fn super_admin_only_rejects_admin() {
        let state = test_state();
        let token = mint(&state, Role::Admin);
        let mut parts = parts_with(Some(("cookie", format!("auth_token={token}"))));
        let result = SuperAdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientRole)));
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_token() {
        let state = test_state();
        let mut parts = parts_with(None);
        let OptionalAuth(identity) = OptionalAuth::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(identity.is_none());
    }
}

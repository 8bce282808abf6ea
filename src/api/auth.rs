// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints: register, login, logout, refresh, me, check.

use axum::{
    extract::State,
    http::{header::CACHE_CONTROL, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        session, Auth, AuthError, ClaimSet, OptionalAuth, Role,
    },
    error::ApiError,
    models::{AuthCheckResponse, LoginRequest, MessageResponse, RegisterRequest, SessionResponse},
    state::AppState,
    store::UserSummary,
};

fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !email.contains(' ') => {
            Ok(())
        }
        _ => Err(ApiError::bad_request("A valid email address is required")),
    }
}

async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("background task failed: {e}")))
}

/// Create an account with the `user` role and start a session.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session cookies set", body = SessionResponse),
        (status = 400, description = "Invalid email or password too short"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), ApiError> {
    validate_email(&request.email)?;

    let password = request.password;
    let password_hash = blocking(move || hash_password(&password)).await??;

    let name = request
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let user = state
        .store
        .write()
        .await
        .create_user(&request.email, name, password_hash, Role::User)?;

    let claims = ClaimSet::new(user.id.clone(), user.email.clone(), user.role);
    let session = session::start_session(jar, &state.auth, &claims)?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        session.jar,
        Json(SessionResponse {
            message: "Registration successful".to_string(),
            user: session.identity,
        }),
    ))
}

/// Verify credentials and start a session.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session cookies set", body = SessionResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let user = state
        .store
        .read()
        .await
        .find_by_email(&request.email)
        .cloned()
        .ok_or(AuthError::InvalidCredentials)?;

    let hash = user.password_hash.clone();
    let password = request.password;
    if !blocking(move || verify_password(&hash, &password)).await? {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let claims = ClaimSet::new(user.id.clone(), user.email.clone(), user.role);
    let session = session::start_session(jar, &state.auth, &claims)?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok((
        session.jar,
        Json(SessionResponse {
            message: "Login successful".to_string(),
            user: session.identity,
        }),
    ))
}

/// Clear the session cookies.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Session cookies cleared", body = MessageResponse))
)]
pub async fn logout(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    if let Some(identity) = identity {
        tracing::info!(user_id = %identity.user_id, "User logged out");
    }

    (
        session::end_session(jar, &state.auth),
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// Trade the refresh cookie for a new session cookie pair.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "New session cookies set", body = SessionResponse),
        (status = 401, description = "Missing, invalid or expired refresh token")
    )
)]
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let result = {
        let store = state.store.read().await;
        session::refresh(jar, &state.auth, |claims| {
            store
                .find_by_id(&claims.user_id)
                .map(|user| ClaimSet::new(user.id.clone(), user.email.clone(), user.role))
        })
    };

    match result {
        Ok(session) => {
            tracing::info!(
                user_id = %session.identity.user_id,
                role = %session.identity.role,
                "Session refreshed"
            );
            (
                session.jar,
                Json(SessionResponse {
                    message: "Token refreshed".to_string(),
                    user: session.identity,
                }),
            )
                .into_response()
        }
        Err(failed) => {
            if failed.reason.is_unauthenticated() {
                tracing::warn!(reason = %failed.reason, "Session refresh failed");
            } else {
                tracing::error!(reason = %failed.reason, "Session refresh failed");
            }
            failed.into_response()
        }
    }
}

/// Profile of the authenticated caller.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tag = "Auth",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserSummary),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn me(Auth(identity): Auth, State(state): State<AppState>) -> Result<Json<UserSummary>, ApiError> {
    let store = state.store.read().await;
    let user = store
        .find_by_id(&identity.user_id)
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(UserSummary::from(user)))
}

/// Report whether the caller has a valid session.
///
/// Always 200 and stateless; clients are expected to debounce their own
/// calls.
#[utoipa::path(
    get,
    path = "/v1/auth/check",
    tag = "Auth",
    responses((status = 200, description = "Session status", body = AuthCheckResponse))
)]
pub async fn check(OptionalAuth(identity): OptionalAuth) -> impl IntoResponse {
    (
        [(CACHE_CONTROL, "private, no-store")],
        Json(AuthCheckResponse {
            authenticated: identity.is_some(),
            user: identity,
        }),
    )
}

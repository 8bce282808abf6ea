// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication and authorization error type.
///
/// `MissingToken`, `InvalidToken` and `ExpiredToken` all become 401 and the
/// response body never says which one happened.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session token on the request
    #[error("no session token present")]
    MissingToken,
    /// Malformed token, bad signature, wrong token kind or unknown role
    #[error("session token is invalid")]
    InvalidToken,
    /// Well-formed token past its expiry
    #[error("session token has expired")]
    ExpiredToken,
    /// Authenticated, but the role is not on the allow-list
    #[error("insufficient permissions")]
    InsufficientRole,
    /// Unknown email or wrong password at login
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Signing failure or other server-side fault
    #[error("internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    message: &'static str,
}

impl AuthError {
    /// Whether this error belongs to the unauthenticated (401) branch.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::ExpiredToken
        )
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Unauthorized",
            AuthError::InvalidToken | AuthError::ExpiredToken => "Invalid token",
            AuthError::InsufficientRole => "Insufficient permissions",
            AuthError::InvalidCredentials => "Invalid credentials",
            AuthError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(ref msg) = self {
            tracing::error!(error = %msg, "Authentication failed internally");
        }
        let body = Json(AuthErrorBody {
            message: self.public_message(),
        });
        (self.status_code(), body).into_response()
    }
}

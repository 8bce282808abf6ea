// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and the authenticated identity.
//!
//! The wire names (`userId`, `email`, `role`) are shared with the web client,
//! which reads the decoded payload of the access token.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Which of the two session tokens a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Identity data embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl ClaimSet {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role: Some(role),
        }
    }
}

/// Full JWT payload: the claim set plus envelope fields.
///
/// Unknown roles fail deserialization, so such tokens never verify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Token kind (`access` or `refresh`)
    pub typ: TokenKind,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

impl Claims {
    pub fn claim_set(&self) -> ClaimSet {
        ClaimSet {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn into_identity(self) -> Identity {
        Identity {
            user_id: self.user_id,
            email: self.email,
            role: self.role.unwrap_or_default(),
        }
    }
}

/// Authenticated caller, produced only from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Opaque user identifier
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

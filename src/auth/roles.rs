// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles and the role gate.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthError, Identity};

/// User roles carried in session tokens.
///
/// ## Roles
///
/// - `User` - Business owner or staff member, default for new accounts
/// - `Admin` - Platform administrator (user overview, analytics)
/// - `SuperAdmin` - Can change other accounts' roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Also the role of tokens without a role claim
    #[default]
    User,
    Admin,
    #[serde(rename = "superadmin")]
    SuperAdmin,
}

/// Roles accepted by admin endpoints.
pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];

/// Roles accepted by superadmin endpoints.
pub const SUPERADMIN_ROLES: &[Role] = &[Role::SuperAdmin];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the role gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    Forbidden,
}

impl Authorization {
    /// Turn a `Forbidden` decision into [`AuthError::InsufficientRole`].
    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            Authorization::Authorized => Ok(()),
            Authorization::Forbidden => Err(AuthError::InsufficientRole),
        }
    }
}

/// Check an already authenticated identity against an allow-list.
///
/// Runs after the auth guard, so "not logged in" (401) and "logged in
/// without privilege" (403) stay distinct.
pub fn authorize(identity: &Identity, allowed: &[Role]) -> Authorization {
    if allowed.contains(&identity.role) {
        Authorization::Authorized
    } else {
        Authorization::Forbidden
    }
}

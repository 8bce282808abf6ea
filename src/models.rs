// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive `ToSchema`
//! for OpenAPI documentation; JSON field names are camelCase to match the web
//! client.
//!
//! Session tokens never appear in bodies; they travel only in `HttpOnly`
//! cookies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Identity, Role};
use crate::store::UserSummary;

// =============================================================================
// Session Models
// =============================================================================

/// Registration request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// Login request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register, login and refresh alongside the session cookies.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionResponse {
    pub message: String,
    pub user: Identity,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Result of the session check endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
}

// =============================================================================
// Admin Models
// =============================================================================

/// Response for the admin user list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
    pub total: usize,
}

/// Role change request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

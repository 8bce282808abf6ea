// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Privileged endpoints.
//!
//! `/v1/admin/*` accepts `admin` and `superadmin`; `/v1/superadmin/*` accepts
//! `superadmin` only. An authenticated caller with a lesser role gets 403,
//! an anonymous one 401.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth::{AdminOnly, Role, SuperAdminOnly},
    error::ApiError,
    models::{UpdateRoleRequest, UserListResponse},
    state::AppState,
    store::UserSummary,
};

/// List all user accounts.
#[utoipa::path(
    get,
    path = "/v1/admin/users",
    tag = "Admin",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "All users", body = UserListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<UserListResponse> {
    let users = state.store.read().await.list_users();
    let total = users.len();
    Json(UserListResponse { users, total })
}

/// Change a user's role.
///
/// The new role reaches the user's tokens at their next login or refresh.
#[utoipa::path(
    put,
    path = "/v1/superadmin/users/{user_id}/role",
    tag = "Admin",
    security(("cookie_auth" = [])),
    params(("user_id" = String, Path, description = "Target user id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserSummary),
        (status = 400, description = "Superadmins cannot demote themselves"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Superadmin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    SuperAdminOnly(actor): SuperAdminOnly,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    if actor.user_id == user_id && request.role != Role::SuperAdmin {
        return Err(ApiError::bad_request("You cannot remove your own superadmin role"));
    }

    let updated = state.store.write().await.set_role(&user_id, request.role)?;

    tracing::info!(
        actor = %actor.user_id,
        user_id = %updated.user_id,
        role = %updated.role,
        "User role changed"
    );

    Ok(Json(updated))
}

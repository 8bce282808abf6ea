// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applies the auth guard to a whole router subtree. The identity is stored
//! in request extensions, where the `Auth`, `AdminOnly` and `SuperAdminOnly`
//! extractors pick it up without verifying the token again.
//!
//! ```rust,ignore
//! let admin = Router::new()
//!     .route("/users", get(list_users))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::authenticate;
use crate::state::AppState;

/// Reject unauthenticated requests with 401 before they reach a handler.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match authenticate(request.headers(), &state.auth) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(reason = %e, path = %request.uri().path(), "Rejected by auth middleware");
            e.into_response()
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Cookie-based JWT sessions and role-gated authorization.
//!
//! ## Auth Flow
//!
//! 1. Login or registration mints an access token (7 days) and a refresh
//!    token (30 days), both HS256 JWTs carrying `userId`, `email`, `role`
//! 2. Both are sent back as `HttpOnly`, `SameSite=Lax` cookies
//!    (`auth_token`, `refresh_token`)
//! 3. Every protected route:
//!    - reads `auth_token` (bearer header only as a fallback)
//!    - verifies signature, expiry and token kind
//!    - rejects with 401, or continues with the caller's `Identity`
//! 4. Privileged routes then check the role against an allow-list (403)
//! 5. `POST /v1/auth/refresh` trades the refresh cookie for a new pair
//!
//! ## Security
//!
//! - Verification is stateless; no database access on the request path
//! - 401 bodies never reveal whether a token was missing, invalid or expired
//! - No revocation list: logout clears cookies, tokens live until expiry

pub mod claims;
pub mod codec;
pub mod cookies;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod session;

pub use claims::{ClaimSet, Claims, Identity, TokenKind};
pub use codec::TokenCodec;
pub use cookies::{CookieSettings, ACCESS_COOKIE, REFRESH_COOKIE};
pub use error::AuthError;
pub use extractor::{authenticate, AdminOnly, Auth, OptionalAuth, SuperAdminOnly, TokenSource};
pub use middleware::require_auth;
pub use roles::{authorize, Authorization, Role, ADMIN_ROLES, SUPERADMIN_ROLES};
pub use session::{refresh, IssuedSession, RefreshFailed, TokenPair};

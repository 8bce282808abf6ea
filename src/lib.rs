// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bizdesk Session - cookie-based JWT sessions for the Bizdesk web app
//!
//! Issues HS256 access and refresh tokens, carries them in `HttpOnly`
//! cookies, and gates routes by authentication and role.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, session cookies, auth guard and role gate
//! - `config` - Environment configuration
//! - `store` - In-memory user accounts

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;

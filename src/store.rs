// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory user record store.
//!
//! Holds the full user profile (including the password hash) that login,
//! registration and the admin endpoints need. The auth guard and role gate
//! never read it; they work from token claims alone.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Role;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an account with this email already exists")]
    DuplicateEmail,
    #[error("user not found: {0}")]
    NotFound(String),
}

/// Stored user account.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user account (no password hash).
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Emails are compared case-insensitively and without surrounding spaces.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<String, UserRecord>,
    /// normalized email -> user id
    emails: HashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_user(
        &mut self,
        email: &str,
        name: Option<String>,
        password_hash: String,
        role: Role,
    ) -> Result<UserRecord, StoreError> {
        let email = normalize_email(email);
        if self.emails.contains_key(&email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            name,
            password_hash,
            role,
            created_at: Utc::now(),
        };
        self.emails.insert(email, user.id.clone());
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.emails
            .get(&normalize_email(email))
            .and_then(|id| self.users.get(id))
    }

    pub fn find_by_id(&self, user_id: &str) -> Option<&UserRecord> {
        self.users.get(user_id)
    }

    /// All users, oldest first.
    pub fn list_users(&self) -> Vec<UserSummary> {
        let mut users: Vec<UserSummary> = self.users.values().map(UserSummary::from).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.email.cmp(&b.email)));
        users
    }

    /// Change a user's role. Takes effect at the user's next login or refresh.
    pub fn set_role(&mut self, user_id: &str, role: Role) -> Result<UserSummary, StoreError> {
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        user.role = role;
        Ok(UserSummary::from(&*user))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_find_user() {
        let mut store = InMemoryStore::new();
        let user = store
            .create_user("Owner@Shop.in ", Some("Asha".to_string()), "hash".to_string(), Role::User)
            .unwrap();
        assert_eq!(user.email, "owner@shop.in");

        let found = store.find_by_email("OWNER@shop.in").unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_by_id(&user.id).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let mut store = InMemoryStore::new();
        store
            .create_user("a@b.com", None, "h".to_string(), Role::User)
            .unwrap();
        let err = store
            .create_user("A@B.com", None, "h".to_string(), Role::Admin)
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[test]
    fn set_role_updates_user() {
        let mut store = InMemoryStore::new();
        let user = store
            .create_user("a@b.com", None, "h".to_string(), Role::User)
            .unwrap();
        let summary = store.set_role(&user.id, Role::Admin).unwrap();
        assert_eq!(summary.role, Role::Admin);
        assert_eq!(store.find_by_id(&user.id).unwrap().role, Role::Admin);
    }

    #[test]
    fn set_role_on_missing_user_fails() {
        let mut store = InMemoryStore::new();
        assert!(matches!(
            store.set_role("missing", Role::Admin),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn summaries_hide_password_hash() {
        let mut store = InMemoryStore::new();
        store
            .create_user("a@b.com", None, "secret-hash".to_string(), Role::User)
            .unwrap();
        let json = serde_json::to_string(&store.list_users()).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"userId\""));
    }
}

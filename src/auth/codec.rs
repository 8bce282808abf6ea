// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token signing and verification.
//!
//! This is the only place tokens are built or checked. Tokens are HS256 JWTs
//! signed with the process-wide `JWT_SECRET`; every server instance must share
//! the secret for sessions to move between them.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::claims::{ClaimSet, Claims, TokenKind};
use super::AuthError;

/// Default access token lifetime.
pub const ACCESS_TOKEN_TTL_DAYS: i64 = 7;

/// Default refresh token lifetime.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// Mints and verifies session tokens with a shared HMAC secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec with the default lifetimes (7 / 30 days).
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify` without leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl: Duration::days(ACCESS_TOKEN_TTL_DAYS),
            refresh_ttl: Duration::days(REFRESH_TOKEN_TTL_DAYS),
        }
    }

    /// Override the token lifetimes.
    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// Configured lifetime for a token kind.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Mint a token with the configured lifetime for `kind`.
    pub fn mint(&self, claims: &ClaimSet, kind: TokenKind) -> Result<String, AuthError> {
        self.mint_with_ttl(claims, kind, self.ttl(kind))
    }

    /// Mint a token with an explicit lifetime.
    ///
    /// A zero or negative `ttl` yields a token that is already expired.
    pub fn mint_with_ttl(
        &self,
        claims: &ClaimSet,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Internal(format!("{kind} token lifetime out of range")))?;
        let payload = Claims {
            user_id: claims.user_id.clone(),
            email: claims.email.clone(),
            role: claims.role,
            typ: kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("failed to sign {kind} token: {e}")))
    }

    /// Verify a token of the expected kind and return its claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`] for malformed tokens, signature
    ///   mismatches, foreign algorithms, unknown roles or the wrong kind
    /// - [`AuthError::ExpiredToken`] when `exp` is not in the future
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            }
        })?;
        let claims = data.claims;

        if claims.typ != kind {
            return Err(AuthError::InvalidToken);
        }
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }
}

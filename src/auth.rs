// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bearer-token verification. Tokens are opaque random strings handed out by
//! the operator CLI; the database only ever sees their SHA-256 digest.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::db::uuid_col;
use crate::error::{AppError, AppResult};

pub const TOKEN_PREFIX: &str = "pfi_";

/// The authenticated user behind the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub id: Uuid,
    /// Plain token; shown once and never stored.
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub id: Uuid,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn issue_token(
    conn: &Connection,
    user_id: Uuid,
    label: &str,
    ttl: Option<Duration>,
    now: DateTime<Utc>,
) -> AppResult<IssuedToken> {
    let id = Uuid::new_v4();
    let token = format!(
        "{}{}{}",
        TOKEN_PREFIX,
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    );
    let expires_at = ttl.map(|d| now + d);
    conn.execute(
        "INSERT INTO api_tokens(id, user_id, token_hash, label, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.to_string(),
            user_id.to_string(),
            hash_token(&token),
            label,
            now,
            expires_at
        ],
    )?;
    tracing::info!(token_id = %id, user_id = %user_id, "issued api token");
    Ok(IssuedToken {
        id,
        token,
        expires_at,
    })
}

pub fn revoke_token(conn: &Connection, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE api_tokens SET revoked_at=?1 WHERE id=?2 AND revoked_at IS NULL",
        params![now, id.to_string()],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound("Token"));
    }
    tracing::info!(token_id = %id, "revoked api token");
    Ok(())
}

pub fn list_tokens(conn: &Connection, user_id: Uuid) -> AppResult<Vec<TokenInfo>> {
    let mut stmt = conn.prepare(
        "SELECT id, label, created_at, expires_at, revoked_at
         FROM api_tokens WHERE user_id=?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], |r| {
        Ok(TokenInfo {
            id: uuid_col(r, 0)?,
            label: r.get(1)?,
            created_at: r.get(2)?,
            expires_at: r.get(3)?,
            revoked_at: r.get(4)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Resolves a presented token to its caller. Missing, unknown, revoked and
/// expired tokens are all reported the same way.
pub fn authenticate(conn: &Connection, token: &str, now: DateTime<Utc>) -> AppResult<Caller> {
    let token = token.trim();
    if !token.starts_with(TOKEN_PREFIX) {
        return Err(AppError::Unauthenticated);
    }
    let found = conn
        .query_row(
            "SELECT t.user_id, t.expires_at, t.revoked_at
             FROM api_tokens t JOIN users u ON u.id = t.user_id
             WHERE t.token_hash=?1",
            params![hash_token(token)],
            |r| {
                Ok((
                    uuid_col(r, 0)?,
                    r.get::<_, Option<DateTime<Utc>>>(1)?,
                    r.get::<_, Option<DateTime<Utc>>>(2)?,
                ))
            },
        )
        .optional()?;
    match found {
        Some((user_id, expires_at, None)) if expires_at.is_none_or(|e| e > now) => {
            Ok(Caller { user_id })
        }
        _ => Err(AppError::Unauthenticated),
    }
}

/// Extracts the credential from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(rest.trim()).filter(|t| !t.is_empty())
    } else {
        None
    }
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;

use super::AppState;
use crate::auth::{Caller, authenticate, bearer_token};
use crate::error::AppError;

/// Resolves `Authorization: Bearer <token>` into the calling user. Any
/// handler that takes a `Caller` is authenticated.
#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthenticated)?;
        let caller = state.db.with(|conn| authenticate(conn, token, Utc::now()))?;
        tracing::debug!(user_id = %caller.user_id, "authenticated");
        Ok(caller)
    }
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! GraphQL schema over the same repository and report functions the REST
//! handlers use. The HTTP handler attaches the authenticated [`Caller`] to
//! every request, so resolvers never see an anonymous call.

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Schema};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use super::AppState;
use crate::auth::Caller;
use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::repo::Repo;

pub mod mutation;
pub mod query;
mod relations;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type PersonifiSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

const MAX_DEPTH: usize = 16;

pub fn build_schema(db: Db) -> PersonifiSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(db)
        .limit_depth(MAX_DEPTH)
        .finish()
}

pub async fn graphql_handler(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<async_graphql::Request>, JsonRejection>,
) -> AppResult<Json<async_graphql::Response>> {
    let Json(request) = body?;
    let response = state.schema.execute(request.data(caller)).await;
    Ok(Json(response))
}

pub(crate) fn to_gql(e: AppError) -> async_graphql::Error {
    if e.is_internal() {
        tracing::error!(error = %e, "graphql resolver failed");
    }
    let code = e.code();
    async_graphql::Error::new(e.messages().join("; ")).extend_with(|_, ext| ext.set("code", code))
}

/// Runs `f` against a caller-bound repository. The outer error is a
/// context problem (no database or caller attached); the inner one is the
/// domain outcome.
pub(crate) fn attempt<T>(
    ctx: &Context<'_>,
    f: impl FnOnce(&Repo<'_>) -> AppResult<T>,
) -> async_graphql::Result<AppResult<T>> {
    let db = ctx.data::<Db>()?;
    let caller = *ctx
        .data::<Caller>()
        .map_err(|_| to_gql(AppError::Unauthenticated))?;
    Ok(db.with(|conn| f(&Repo::new(conn, caller))))
}

pub(crate) fn resolve<T>(
    ctx: &Context<'_>,
    f: impl FnOnce(&Repo<'_>) -> AppResult<T>,
) -> async_graphql::Result<T> {
    attempt(ctx, f)?.map_err(to_gql)
}

/// Missing and foreign rows both resolve to `null`.
pub(crate) fn resolve_opt<T>(
    ctx: &Context<'_>,
    f: impl FnOnce(&Repo<'_>) -> AppResult<T>,
) -> async_graphql::Result<Option<T>> {
    match attempt(ctx, f)? {
        Ok(v) => Ok(Some(v)),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(to_gql(e)),
    }
}

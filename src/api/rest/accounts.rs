// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use super::{IdPath, JsonBody, QueryArgs};
use crate::api::AppState;
use crate::auth::Caller;
use crate::error::AppResult;
use crate::models::{Account, AccountPatch, NewAccount};
use crate::repo::accounts::{self, AccountFilter};
use crate::repo::{Page, PageRequest, Repo};

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    filter: QueryArgs<AccountFilter>,
    page: QueryArgs<PageRequest>,
) -> AppResult<Json<Page<Account>>> {
    let filter = filter?.0;
    let spec = state.page_spec(page?.0)?;
    let page = state
        .db
        .with(|conn| accounts::page(&Repo::new(conn, caller), &filter, spec))?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<NewAccount>,
) -> AppResult<(StatusCode, Json<Account>)> {
    let Json(input) = body?;
    let account = state
        .db
        .with(|conn| accounts::create(&Repo::new(conn, caller), &input))?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<Json<Account>> {
    let id = id?.0;
    let account = state.db.with(|conn| Repo::new(conn, caller).get::<Account>(id))?;
    Ok(Json(account))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
    body: JsonBody<AccountPatch>,
) -> AppResult<Json<Account>> {
    let id = id?.0;
    let Json(patch) = body?;
    let account = state
        .db
        .with(|conn| accounts::update(&Repo::new(conn, caller), id, &patch))?;
    Ok(Json(account))
}

pub async fn destroy(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<StatusCode> {
    let id = id?.0;
    state
        .db
        .with(|conn| Repo::new(conn, caller).delete::<Account>(id))?;
    Ok(StatusCode::NO_CONTENT)
}

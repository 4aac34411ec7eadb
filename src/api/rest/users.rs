// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::Json;
use axum::extract::State;

use super::{IdPath, JsonBody, QueryArgs};
use crate::api::AppState;
use crate::auth::Caller;
use crate::error::AppResult;
use crate::models::{User, UserPatch};
use crate::repo::{Page, PageRequest, Repo, users};

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    page: QueryArgs<PageRequest>,
) -> AppResult<Json<Page<User>>> {
    let spec = state.page_spec(page?.0)?;
    let page = state.db.with(|conn| users::page(&Repo::new(conn, caller), spec))?;
    Ok(Json(page))
}

pub async fn me(State(state): State<AppState>, caller: Caller) -> AppResult<Json<User>> {
    let user = state.db.with(|conn| users::me(&Repo::new(conn, caller)))?;
    Ok(Json(user))
}

pub async fn update_me(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<UserPatch>,
) -> AppResult<Json<User>> {
    let Json(patch) = body?;
    let user = state
        .db
        .with(|conn| users::update_me(&Repo::new(conn, caller), &patch))?;
    Ok(Json(user))
}

pub async fn retrieve(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<Json<User>> {
    let id = id?.0;
    let user = state.db.with(|conn| Repo::new(conn, caller).get::<User>(id))?;
    Ok(Json(user))
}

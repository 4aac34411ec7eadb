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
use crate::models::{Category, CategoryPatch, NewCategory};
use crate::repo::categories::{self, CategoryFilter};
use crate::repo::{Page, PageRequest, Repo};

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    filter: QueryArgs<CategoryFilter>,
    page: QueryArgs<PageRequest>,
) -> AppResult<Json<Page<Category>>> {
    let filter = filter?.0;
    let spec = state.page_spec(page?.0)?;
    let page = state
        .db
        .with(|conn| categories::page(&Repo::new(conn, caller), &filter, spec))?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<NewCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let Json(input) = body?;
    let category = state
        .db
        .with(|conn| categories::create(&Repo::new(conn, caller), &input))?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Deactivated categories stay reachable here.
pub async fn retrieve(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<Json<Category>> {
    let id = id?.0;
    let category = state
        .db
        .with(|conn| categories::get(&Repo::new(conn, caller), id))?;
    Ok(Json(category))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
    body: JsonBody<CategoryPatch>,
) -> AppResult<Json<Category>> {
    let id = id?.0;
    let Json(patch) = body?;
    let category = state
        .db
        .with(|conn| categories::update(&Repo::new(conn, caller), id, &patch))?;
    Ok(Json(category))
}

pub async fn destroy(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<StatusCode> {
    let id = id?.0;
    state
        .db
        .with(|conn| Repo::new(conn, caller).delete::<Category>(id))?;
    Ok(StatusCode::NO_CONTENT)
}

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
use crate::models::{Goal, GoalPatch, NewGoal};
use crate::repo::goals::{self, GoalFilter};
use crate::repo::{Page, PageRequest, Repo};

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    filter: QueryArgs<GoalFilter>,
    page: QueryArgs<PageRequest>,
) -> AppResult<Json<Page<Goal>>> {
    let filter = filter?.0;
    let spec = state.page_spec(page?.0)?;
    let page = state
        .db
        .with(|conn| goals::page(&Repo::new(conn, caller), &filter, spec))?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<NewGoal>,
) -> AppResult<(StatusCode, Json<Goal>)> {
    let Json(input) = body?;
    let goal = state
        .db
        .with(|conn| goals::create(&Repo::new(conn, caller), &input))?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<Json<Goal>> {
    let id = id?.0;
    let goal = state.db.with(|conn| Repo::new(conn, caller).get::<Goal>(id))?;
    Ok(Json(goal))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
    body: JsonBody<GoalPatch>,
) -> AppResult<Json<Goal>> {
    let id = id?.0;
    let Json(patch) = body?;
    let goal = state
        .db
        .with(|conn| goals::update(&Repo::new(conn, caller), id, &patch))?;
    Ok(Json(goal))
}

pub async fn destroy(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<StatusCode> {
    let id = id?.0;
    state.db.with(|conn| Repo::new(conn, caller).delete::<Goal>(id))?;
    Ok(StatusCode::NO_CONTENT)
}

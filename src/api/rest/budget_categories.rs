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
use crate::models::{BudgetCategory, BudgetCategoryPatch, NewBudgetCategory};
use crate::repo::budgets::{self, BudgetCategoryFilter};
use crate::repo::{Page, PageRequest, Repo};

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    filter: QueryArgs<BudgetCategoryFilter>,
    page: QueryArgs<PageRequest>,
) -> AppResult<Json<Page<BudgetCategory>>> {
    let filter = filter?.0;
    let spec = state.page_spec(page?.0)?;
    let page = state
        .db
        .with(|conn| budgets::page_allocations(&Repo::new(conn, caller), &filter, spec))?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<NewBudgetCategory>,
) -> AppResult<(StatusCode, Json<BudgetCategory>)> {
    let Json(input) = body?;
    let row = state
        .db
        .with(|conn| budgets::create_allocation(&Repo::new(conn, caller), &input))?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<Json<BudgetCategory>> {
    let id = id?.0;
    let row = state
        .db
        .with(|conn| Repo::new(conn, caller).get::<BudgetCategory>(id))?;
    Ok(Json(row))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
    body: JsonBody<BudgetCategoryPatch>,
) -> AppResult<Json<BudgetCategory>> {
    let id = id?.0;
    let Json(patch) = body?;
    let row = state
        .db
        .with(|conn| budgets::update_allocation(&Repo::new(conn, caller), id, &patch))?;
    Ok(Json(row))
}

pub async fn destroy(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<StatusCode> {
    let id = id?.0;
    state
        .db
        .with(|conn| Repo::new(conn, caller).delete::<BudgetCategory>(id))?;
    Ok(StatusCode::NO_CONTENT)
}

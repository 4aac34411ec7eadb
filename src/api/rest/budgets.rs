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
use crate::models::{Budget, BudgetPatch, NewBudget};
use crate::reports::{self, BudgetSummary};
use crate::repo::budgets::{self, BudgetFilter};
use crate::repo::{Page, PageRequest, Repo};

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    filter: QueryArgs<BudgetFilter>,
    page: QueryArgs<PageRequest>,
) -> AppResult<Json<Page<Budget>>> {
    let filter = filter?.0;
    let spec = state.page_spec(page?.0)?;
    let page = state
        .db
        .with(|conn| budgets::page(&Repo::new(conn, caller), &filter, spec))?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<NewBudget>,
) -> AppResult<(StatusCode, Json<Budget>)> {
    let Json(input) = body?;
    let budget = state
        .db
        .with(|conn| budgets::create(&Repo::new(conn, caller), &input))?;
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<Json<Budget>> {
    let id = id?.0;
    let budget = state
        .db
        .with(|conn| budgets::get(&Repo::new(conn, caller), id))?;
    Ok(Json(budget))
}

pub async fn summary(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<Json<BudgetSummary>> {
    let id = id?.0;
    let summary = state
        .db
        .with(|conn| reports::budget_summary(&Repo::new(conn, caller), id))?;
    Ok(Json(summary))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
    body: JsonBody<BudgetPatch>,
) -> AppResult<Json<Budget>> {
    let id = id?.0;
    let Json(patch) = body?;
    let budget = state
        .db
        .with(|conn| budgets::update(&Repo::new(conn, caller), id, &patch))?;
    Ok(Json(budget))
}

pub async fn destroy(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<StatusCode> {
    let id = id?.0;
    state
        .db
        .with(|conn| Repo::new(conn, caller).delete::<Budget>(id))?;
    Ok(StatusCode::NO_CONTENT)
}

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
use crate::models::{NewTransaction, Transaction, TransactionDetail, TransactionPatch};
use crate::reports::{self, CategoryTotal, TransactionSummary};
use crate::repo::transactions::{self, TransactionFilter};
use crate::repo::{Page, PageRequest, Repo};

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    filter: QueryArgs<TransactionFilter>,
    page: QueryArgs<PageRequest>,
) -> AppResult<Json<Page<TransactionDetail>>> {
    let filter = filter?.0;
    let spec = state.page_spec(page?.0)?;
    let page = state
        .db
        .with(|conn| transactions::page_detailed(&Repo::new(conn, caller), &filter, spec))?;
    Ok(Json(page))
}

/// Income, expense and net over the same filtered set `list` pages through.
pub async fn summary(
    State(state): State<AppState>,
    caller: Caller,
    filter: QueryArgs<TransactionFilter>,
) -> AppResult<Json<TransactionSummary>> {
    let filter = filter?.0;
    let rows = state
        .db
        .with(|conn| transactions::list(&Repo::new(conn, caller), &filter))?;
    Ok(Json(reports::transaction_summary(&rows)))
}

pub async fn by_category(
    State(state): State<AppState>,
    caller: Caller,
    filter: QueryArgs<TransactionFilter>,
) -> AppResult<Json<Vec<CategoryTotal>>> {
    let filter = filter?.0;
    let totals = state.db.with(|conn| {
        let repo = Repo::new(conn, caller);
        let rows = transactions::list(&repo, &filter)?;
        reports::totals_by_category(&repo, &rows)
    })?;
    Ok(Json(totals))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<NewTransaction>,
) -> AppResult<(StatusCode, Json<TransactionDetail>)> {
    let Json(input) = body?;
    let tx = state.db.with(|conn| {
        let repo = Repo::new(conn, caller);
        let tx = transactions::create(&repo, &input)?;
        transactions::detail(&repo, tx)
    })?;
    Ok((StatusCode::CREATED, Json(tx)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<Json<TransactionDetail>> {
    let id = id?.0;
    let tx = state.db.with(|conn| {
        let repo = Repo::new(conn, caller);
        let tx = repo.get::<Transaction>(id)?;
        transactions::detail(&repo, tx)
    })?;
    Ok(Json(tx))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
    body: JsonBody<TransactionPatch>,
) -> AppResult<Json<TransactionDetail>> {
    let id = id?.0;
    let Json(patch) = body?;
    let tx = state.db.with(|conn| {
        let repo = Repo::new(conn, caller);
        let tx = transactions::update(&repo, id, &patch)?;
        transactions::detail(&repo, tx)
    })?;
    Ok(Json(tx))
}

pub async fn destroy(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<StatusCode> {
    let id = id?.0;
    state
        .db
        .with(|conn| Repo::new(conn, caller).delete::<Transaction>(id))?;
    Ok(StatusCode::NO_CONTENT)
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use super::QueryArgs;
use crate::api::AppState;
use crate::auth::Caller;
use crate::error::AppResult;
use crate::reports::{
    self, CategoryTotal, DailyTotal, DaysWindow, IncomeVsExpenses, MonthlySummary, MonthsWindow,
    NetWorth,
};
use crate::repo::Repo;

pub async fn spending_trends(
    State(state): State<AppState>,
    caller: Caller,
    window: QueryArgs<DaysWindow>,
) -> AppResult<Json<Vec<DailyTotal>>> {
    let days = window?.0.days;
    let today = Utc::now().date_naive();
    let rows = state
        .db
        .with(|conn| reports::spending_trends(&Repo::new(conn, caller), today, days))?;
    Ok(Json(rows))
}

pub async fn category_breakdown(
    State(state): State<AppState>,
    caller: Caller,
    window: QueryArgs<DaysWindow>,
) -> AppResult<Json<Vec<CategoryTotal>>> {
    let days = window?.0.days;
    let today = Utc::now().date_naive();
    let rows = state
        .db
        .with(|conn| reports::category_breakdown(&Repo::new(conn, caller), today, days))?;
    Ok(Json(rows))
}

pub async fn income_vs_expenses(
    State(state): State<AppState>,
    caller: Caller,
    window: QueryArgs<DaysWindow>,
) -> AppResult<Json<IncomeVsExpenses>> {
    let days = window?.0.days;
    let today = Utc::now().date_naive();
    let out = state
        .db
        .with(|conn| reports::income_vs_expenses(&Repo::new(conn, caller), today, days))?;
    Ok(Json(out))
}

pub async fn net_worth(State(state): State<AppState>, caller: Caller) -> AppResult<Json<NetWorth>> {
    let out = state
        .db
        .with(|conn| reports::net_worth(&Repo::new(conn, caller)))?;
    Ok(Json(out))
}

pub async fn monthly_summary(
    State(state): State<AppState>,
    caller: Caller,
    window: QueryArgs<MonthsWindow>,
) -> AppResult<Json<Vec<MonthlySummary>>> {
    let months = window?.0.months;
    let today = Utc::now().date_naive();
    let rows = state
        .db
        .with(|conn| reports::monthly_summary(&Repo::new(conn, caller), today, months))?;
    Ok(Json(rows))
}

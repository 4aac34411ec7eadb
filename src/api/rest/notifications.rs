// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use super::{IdPath, JsonBody, QueryArgs};
use crate::api::AppState;
use crate::auth::Caller;
use crate::error::AppResult;
use crate::models::{NewNotification, Notification, NotificationPatch};
use crate::repo::notifications::{self, NotificationFilter};
use crate::repo::{Page, PageRequest, Repo};

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    filter: QueryArgs<NotificationFilter>,
    page: QueryArgs<PageRequest>,
) -> AppResult<Json<Page<Notification>>> {
    let filter = filter?.0;
    let spec = state.page_spec(page?.0)?;
    let page = state
        .db
        .with(|conn| notifications::page(&Repo::new(conn, caller), &filter, spec))?;
    Ok(Json(page))
}

pub async fn unread(
    State(state): State<AppState>,
    caller: Caller,
) -> AppResult<Json<Vec<Notification>>> {
    let rows = state
        .db
        .with(|conn| notifications::unread(&Repo::new(conn, caller)))?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<NewNotification>,
) -> AppResult<(StatusCode, Json<Notification>)> {
    let Json(input) = body?;
    let row = state
        .db
        .with(|conn| notifications::create(&Repo::new(conn, caller), &input))?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<Json<Notification>> {
    let id = id?.0;
    let row = state
        .db
        .with(|conn| Repo::new(conn, caller).get::<Notification>(id))?;
    Ok(Json(row))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
    body: JsonBody<NotificationPatch>,
) -> AppResult<Json<Notification>> {
    let id = id?.0;
    let Json(patch) = body?;
    let row = state
        .db
        .with(|conn| notifications::update(&Repo::new(conn, caller), id, &patch))?;
    Ok(Json(row))
}

pub async fn mark_read(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<Json<Notification>> {
    let id = id?.0;
    let row = state
        .db
        .with(|conn| notifications::mark_read(&Repo::new(conn, caller), id))?;
    Ok(Json(row))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    caller: Caller,
) -> AppResult<Json<Value>> {
    let count = state
        .db
        .with(|conn| notifications::mark_all_read(&Repo::new(conn, caller)))?;
    Ok(Json(json!({ "status": "all marked as read", "count": count })))
}

pub async fn destroy(
    State(state): State<AppState>,
    caller: Caller,
    id: IdPath,
) -> AppResult<StatusCode> {
    let id = id?.0;
    state
        .db
        .with(|conn| Repo::new(conn, caller).delete::<Notification>(id))?;
    Ok(StatusCode::NO_CONTENT)
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rusqlite::{Row, params};
use serde::Deserialize;
use uuid::Uuid;

use super::{Entity, ListQuery, Ownership, Page, PageSpec, Repo};
use crate::db::uuid_col;
use crate::error::{AppResult, FieldErrors};
use crate::models::{NewNotification, Notification, NotificationPatch};
use crate::utils::check_text;

impl Entity for Notification {
    const KIND: &'static str = "Notification";
    const TABLE: &'static str = "notifications";
    const SELECT: &'static str = "SELECT e.id, e.user_id, e.title, e.message, e.is_read,
        e.created_at, e.updated_at FROM notifications e";

    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Notification {
            id: uuid_col(r, 0)?,
            user_id: uuid_col(r, 1)?,
            title: r.get(2)?,
            message: r.get(3)?,
            is_read: r.get(4)?,
            created_at: r.get(5)?,
            updated_at: r.get(6)?,
        })
    }

    fn ownership(&self) -> Ownership {
        Ownership::User(self.user_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilter {
    pub is_read: Option<bool>,
    pub ordering: Option<String>,
}

const ORDERING: &[(&str, &str)] = &[("created_at", "e.created_at"), ("is_read", "e.is_read")];

fn validate(errors: &mut FieldErrors, n: &Notification) {
    check_text(errors, "title", &n.title, 120, true);
    check_text(errors, "message", &n.message, 2000, true);
}

fn query(repo: &Repo, f: &NotificationFilter) -> AppResult<ListQuery> {
    let mut q = ListQuery::new(Notification::SELECT);
    q.and("e.user_id = ?", repo.user_id().to_string());
    if let Some(read) = f.is_read {
        q.and("e.is_read = ?", i64::from(read));
    }
    q.order_by(f.ordering.as_deref(), ORDERING, "-created_at")?;
    Ok(q)
}

pub fn list(repo: &Repo, f: &NotificationFilter) -> AppResult<Vec<Notification>> {
    query(repo, f)?.fetch_all(repo.conn())
}

pub fn page(repo: &Repo, f: &NotificationFilter, spec: PageSpec) -> AppResult<Page<Notification>> {
    query(repo, f)?.fetch_page(repo.conn(), spec)
}

pub fn unread(repo: &Repo) -> AppResult<Vec<Notification>> {
    list(
        repo,
        &NotificationFilter {
            is_read: Some(false),
            ordering: None,
        },
    )
}

pub fn create(repo: &Repo, input: &NewNotification) -> AppResult<Notification> {
    let now = Utc::now();
    let n = Notification {
        id: Uuid::new_v4(),
        user_id: repo.user_id(),
        title: input.title.trim().to_string(),
        message: input.message.clone(),
        is_read: false,
        created_at: now,
        updated_at: now,
    };
    let mut errors = FieldErrors::new();
    validate(&mut errors, &n);
    errors.finish()?;

    repo.conn().execute(
        "INSERT INTO notifications(id, user_id, title, message, is_read, created_at, updated_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            n.id.to_string(),
            n.user_id.to_string(),
            n.title,
            n.message,
            n.is_read,
            n.created_at,
            n.updated_at
        ],
    )?;
    repo.get::<Notification>(n.id)
}

pub fn update(repo: &Repo, id: Uuid, patch: &NotificationPatch) -> AppResult<Notification> {
    let mut n = repo.get_for_write::<Notification>(id)?;
    if let Some(v) = &patch.title {
        n.title = v.trim().to_string();
    }
    if let Some(v) = &patch.message {
        n.message = v.clone();
    }
    if let Some(v) = patch.is_read {
        n.is_read = v;
    }
    let mut errors = FieldErrors::new();
    validate(&mut errors, &n);
    errors.finish()?;

    repo.conn().execute(
        "UPDATE notifications SET title=?1, message=?2, is_read=?3, updated_at=?4 WHERE id=?5",
        params![n.title, n.message, n.is_read, Utc::now(), n.id.to_string()],
    )?;
    repo.get::<Notification>(id)
}

pub fn mark_read(repo: &Repo, id: Uuid) -> AppResult<Notification> {
    update(
        repo,
        id,
        &NotificationPatch {
            is_read: Some(true),
            ..Default::default()
        },
    )
}

/// Returns how many notifications changed state.
pub fn mark_all_read(repo: &Repo) -> AppResult<usize> {
    let changed = repo.conn().execute(
        "UPDATE notifications SET is_read = 1, updated_at = ?1 WHERE user_id = ?2 AND is_read = 0",
        params![Utc::now(), repo.user_id().to_string()],
    )?;
    tracing::info!(user_id = %repo.user_id(), changed, "marked notifications read");
    Ok(changed)
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use super::{Entity, Ownership, Page, PageSpec, Repo};
use crate::db::uuid_col;
use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{NewUser, User, UserPatch};
use crate::utils::{DEFAULT_CURRENCY, check_text, is_valid_email, normalize_currency};

impl Entity for User {
    const KIND: &'static str = "User";
    const TABLE: &'static str = "users";
    const SELECT: &'static str = "SELECT e.id, e.email, e.first_name, e.last_name, e.phone_number,
        e.preferred_currency, e.country, e.timezone, e.language, e.date_joined FROM users e";

    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: uuid_col(r, 0)?,
            email: r.get(1)?,
            first_name: r.get(2)?,
            last_name: r.get(3)?,
            phone_number: r.get(4)?,
            preferred_currency: r.get(5)?,
            country: r.get(6)?,
            timezone: r.get(7)?,
            language: r.get(8)?,
            date_joined: r.get(9)?,
        })
    }

    /// A user record is owned by itself.
    fn ownership(&self) -> Ownership {
        Ownership::User(self.id)
    }
}

/// Operator path: registers a user outside any request.
pub fn create(conn: &Connection, input: &NewUser, now: DateTime<Utc>) -> AppResult<User> {
    let mut errors = FieldErrors::new();
    let email = input.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        errors.push("email", "Enter a valid email address.");
    }
    let first_name = input.first_name.clone().unwrap_or_default();
    let last_name = input.last_name.clone().unwrap_or_default();
    check_text(&mut errors, "first_name", &first_name, 150, false);
    check_text(&mut errors, "last_name", &last_name, 150, false);
    let currency = normalize_currency(
        &mut errors,
        "preferred_currency",
        input.preferred_currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
    );
    if find_by_email(conn, &email)?.is_some() {
        errors.push("email", "A user with that email already exists.");
    }
    errors.finish()?;

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO users(id, email, first_name, last_name, preferred_currency, date_joined)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id.to_string(), email, first_name, last_name, currency, now],
    )?;
    tracing::info!(user_id = %id, "created user");
    by_id(conn, id)
}

pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    let sql = format!("{} WHERE e.email = ?1", User::SELECT);
    let user = conn
        .query_row(&sql, params![email.trim().to_lowercase()], |r| User::from_row(r))
        .optional()?;
    Ok(user)
}

fn by_id(conn: &Connection, id: Uuid) -> AppResult<User> {
    let sql = format!("{} WHERE e.id = ?1", User::SELECT);
    conn.query_row(&sql, params![id.to_string()], |r| User::from_row(r))
        .optional()?
        .ok_or(AppError::NotFound(User::KIND))
}

pub fn list_all(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY e.date_joined, e.email", User::SELECT))?;
    let rows = stmt.query_map([], |r| User::from_row(r))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn me(repo: &Repo) -> AppResult<User> {
    repo.get::<User>(repo.user_id())
}

/// The user listing only ever contains the caller.
pub fn list(repo: &Repo) -> AppResult<Vec<User>> {
    Ok(vec![me(repo)?])
}

pub fn page(repo: &Repo, spec: PageSpec) -> AppResult<Page<User>> {
    Ok(Page::from_rows(list(repo)?, spec))
}

pub fn update_me(repo: &Repo, patch: &UserPatch) -> AppResult<User> {
    let mut user = repo.get_for_write::<User>(repo.user_id())?;
    let mut errors = FieldErrors::new();
    if let Some(v) = &patch.first_name {
        check_text(&mut errors, "first_name", v, 150, false);
        user.first_name = v.clone();
    }
    if let Some(v) = &patch.last_name {
        check_text(&mut errors, "last_name", v, 150, false);
        user.last_name = v.clone();
    }
    if let Some(v) = &patch.phone_number {
        check_text(&mut errors, "phone_number", v, 20, false);
        user.phone_number = v.clone();
    }
    if let Some(v) = &patch.preferred_currency {
        user.preferred_currency = normalize_currency(&mut errors, "preferred_currency", v);
    }
    if let Some(v) = &patch.country {
        check_text(&mut errors, "country", v, 2, true);
        user.country = v.trim().to_uppercase();
    }
    if let Some(v) = &patch.timezone {
        check_text(&mut errors, "timezone", v, 50, true);
        user.timezone = v.clone();
    }
    if let Some(v) = &patch.language {
        check_text(&mut errors, "language", v, 10, true);
        user.language = v.clone();
    }
    errors.finish()?;

    repo.conn().execute(
        "UPDATE users SET first_name=?1, last_name=?2, phone_number=?3, preferred_currency=?4,
         country=?5, timezone=?6, language=?7 WHERE id=?8",
        params![
            user.first_name,
            user.last_name,
            user.phone_number,
            user.preferred_currency,
            user.country,
            user.timezone,
            user.language,
            user.id.to_string()
        ],
    )?;
    Ok(user)
}

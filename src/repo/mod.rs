// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Capability-checked access to owner-scoped rows.
//!
//! Every entity kind implements [`Entity`]; [`Repo`] is bound to one caller and
//! applies the same read and write gates to all of them, so no handler ever
//! performs its own ownership comparison.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{AppError, AppResult};

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod goals;
pub mod notifications;
pub mod transactions;
pub mod users;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    User(Uuid),
    /// Visible to everyone, mutable by no one.
    System,
}

pub trait Entity: Sized {
    /// Human-readable kind used in "not found" messages.
    const KIND: &'static str;
    const TABLE: &'static str;
    /// Column list plus FROM clause; the entity's own table is aliased `e`.
    const SELECT: &'static str;
    /// Deletion flips `is_active` instead of removing the row.
    const SOFT_DELETE: bool = false;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn ownership(&self) -> Ownership;
}

pub struct Repo<'a> {
    conn: &'a Connection,
    caller: Caller,
}

impl<'a> Repo<'a> {
    pub fn new(conn: &'a Connection, caller: Caller) -> Self {
        Self { conn, caller }
    }

    pub fn conn(&self) -> &'a Connection {
        self.conn
    }

    pub fn user_id(&self) -> Uuid {
        self.caller.user_id
    }

    fn fetch<E: Entity>(&self, id: Uuid) -> AppResult<Option<E>> {
        let sql = format!("{} WHERE e.id = ?1", E::SELECT);
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], |r| E::from_row(r))
            .optional()?;
        Ok(row)
    }

    fn visible(&self, ownership: Ownership) -> bool {
        match ownership {
            Ownership::User(owner) => owner == self.caller.user_id,
            Ownership::System => true,
        }
    }

    /// Read gate: the row if the caller owns it or it is system-shared.
    /// Foreign rows are reported exactly like missing ones.
    pub fn get<E: Entity>(&self, id: Uuid) -> AppResult<E> {
        match self.fetch::<E>(id)? {
            Some(row) if self.visible(row.ownership()) => Ok(row),
            _ => Err(AppError::NotFound(E::KIND)),
        }
    }

    /// Write gate: like [`Repo::get`], but system-shared rows are refused.
    pub fn get_for_write<E: Entity>(&self, id: Uuid) -> AppResult<E> {
        let row = self.get::<E>(id)?;
        if row.ownership() == Ownership::System {
            return Err(AppError::PermissionDenied(format!(
                "Cannot modify system {}",
                E::KIND.to_lowercase()
            )));
        }
        Ok(row)
    }

    /// Re-checks ownership at deletion time, then removes or deactivates the row.
    pub fn delete<E: Entity>(&self, id: Uuid) -> AppResult<()> {
        self.get_for_write::<E>(id)?;
        if E::SOFT_DELETE {
            self.conn.execute(
                &format!(
                    "UPDATE {} SET is_active = 0, updated_at = ?1 WHERE id = ?2",
                    E::TABLE
                ),
                params![chrono::Utc::now(), id.to_string()],
            )?;
        } else {
            self.conn.execute(
                &format!("DELETE FROM {} WHERE id = ?1", E::TABLE),
                params![id.to_string()],
            )?;
        }
        tracing::info!(kind = E::KIND, id = %id, soft = E::SOFT_DELETE, "deleted");
        Ok(())
    }
}

/// Requested page. Both fields are optional on the wire.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn resolve(&self, default_size: u32, max_size: u32) -> AppResult<PageSpec> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::invalid("page", "Pages are numbered from 1."));
        }
        let page_size = self.page_size.unwrap_or(default_size);
        if page_size == 0 {
            return Err(AppError::invalid("page_size", "Must be at least 1."));
        }
        Ok(PageSpec {
            page,
            page_size: page_size.min(max_size),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Pages an already materialized result set.
    pub fn from_rows(rows: Vec<T>, spec: PageSpec) -> Self {
        let count = rows.len() as i64;
        let offset = (spec.page as usize - 1) * spec.page_size as usize;
        let results: Vec<T> = rows
            .into_iter()
            .skip(offset)
            .take(spec.page_size as usize)
            .collect();
        let shown = (offset + results.len()) as i64;
        Page {
            count,
            page: spec.page,
            page_size: spec.page_size,
            next: (shown < count).then_some(spec.page + 1),
            previous: (spec.page > 1).then_some(spec.page - 1),
            results,
        }
    }

    pub fn try_map<U>(self, f: impl FnMut(T) -> AppResult<U>) -> AppResult<Page<U>> {
        let results = self.results.into_iter().map(f).collect::<AppResult<Vec<U>>>()?;
        Ok(Page {
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            next: self.next,
            previous: self.previous,
            results,
        })
    }
}

/// Escapes LIKE metacharacters so the term matches literally under `ESCAPE '\\'`.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Incrementally built `SELECT` with positional parameters.
pub struct ListQuery {
    sql: String,
    params: Vec<Value>,
    order: String,
}

impl ListQuery {
    pub fn new(select: &str) -> Self {
        Self {
            sql: format!("{} WHERE 1=1", select),
            params: Vec::new(),
            order: String::new(),
        }
    }

    /// Adds ` AND <clause>` where `clause` holds exactly one `?`.
    pub fn and(&mut self, clause: &str, value: impl Into<Value>) -> &mut Self {
        self.sql.push_str(" AND ");
        self.sql.push_str(clause);
        self.params.push(value.into());
        self
    }

    pub fn and_raw(&mut self, clause: &str) -> &mut Self {
        self.sql.push_str(" AND ");
        self.sql.push_str(clause);
        self
    }

    /// Case-insensitive substring match over any of `columns`.
    pub fn search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
            return self;
        };
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let ors: Vec<String> = columns
            .iter()
            .map(|c| format!("lower({}) LIKE ? ESCAPE '\\'", c))
            .collect();
        self.sql.push_str(&format!(" AND ({})", ors.join(" OR ")));
        for _ in columns {
            self.params.push(Value::Text(pattern.clone()));
        }
        self
    }

    /// Applies a client `ordering` (comma separated, `-` for descending)
    /// restricted to the `allowed` (field, sql expression) pairs, falling back
    /// to `default`.
    pub fn order_by(
        &mut self,
        requested: Option<&str>,
        allowed: &[(&str, &str)],
        default: &str,
    ) -> AppResult<&mut Self> {
        let spec = requested
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default);
        let mut terms = Vec::new();
        let mut last_desc = false;
        for raw in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (field, desc) = match raw.strip_prefix('-') {
                Some(f) => (f, true),
                None => (raw, false),
            };
            let Some((_, expr)) = allowed.iter().find(|(name, _)| *name == field) else {
                return Err(AppError::invalid(
                    "ordering",
                    format!("Cannot order by '{}'", field),
                ));
            };
            last_desc = desc;
            terms.push(format!("{} {}", expr, if desc { "DESC" } else { "ASC" }));
        }
        terms.push(format!("e.rowid {}", if last_desc { "DESC" } else { "ASC" }));
        self.order = format!(" ORDER BY {}", terms.join(", "));
        Ok(self)
    }

    pub fn fetch_all<E: Entity>(&self, conn: &Connection) -> AppResult<Vec<E>> {
        let sql = format!("{}{}", self.sql, self.order);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(self.params.iter()), |r| E::from_row(r))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn fetch_page<E: Entity>(&self, conn: &Connection, spec: PageSpec) -> AppResult<Page<E>> {
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM ({})", self.sql),
            params_from_iter(self.params.iter()),
            |r| r.get(0),
        )?;
        let offset = i64::from(spec.page - 1) * i64::from(spec.page_size);
        let sql = format!(
            "{}{} LIMIT {} OFFSET {}",
            self.sql, self.order, spec.page_size, offset
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(self.params.iter()), |r| E::from_row(r))?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        let shown = offset + results.len() as i64;
        Ok(Page {
            count,
            page: spec.page,
            page_size: spec.page_size,
            next: (shown < count).then_some(spec.page + 1),
            previous: (spec.page > 1).then_some(spec.page - 1),
            results,
        })
    }
}

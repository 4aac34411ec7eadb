// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::{Entity, ListQuery, Ownership, Page, PageSpec, Repo};
use crate::db::{opt_uuid_col, uuid_col};
use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{Category, CategoryPatch, CategoryType, NewCategory};
use crate::utils::check_text;

/// Nesting deeper than this is not rendered.
const MAX_DEPTH: usize = 8;

const VISIBLE: &str = "(e.user_id = ? OR e.is_system = 1)";

impl Entity for Category {
    const KIND: &'static str = "Category";
    const TABLE: &'static str = "categories";
    const SELECT: &'static str = "SELECT e.id, e.user_id, e.name, e.category_type, e.parent_id,
        e.is_system, e.is_active, e.created_at, e.updated_at FROM categories e";
    const SOFT_DELETE: bool = true;

    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            id: uuid_col(r, 0)?,
            user_id: opt_uuid_col(r, 1)?,
            name: r.get(2)?,
            category_type: r.get(3)?,
            parent_id: opt_uuid_col(r, 4)?,
            is_system: r.get(5)?,
            is_active: r.get(6)?,
            children: Vec::new(),
            created_at: r.get(7)?,
            updated_at: r.get(8)?,
        })
    }

    fn ownership(&self) -> Ownership {
        match (self.is_system, self.user_id) {
            (false, Some(owner)) => Ownership::User(owner),
            _ => Ownership::System,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryFilter {
    pub category_type: Option<CategoryType>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

const ORDERING: &[(&str, &str)] = &[("name", "e.name"), ("created_at", "e.created_at")];

/// Catalogue installed by `personifi category seed`.
pub const SYSTEM_CATEGORIES: &[(&str, CategoryType)] = &[
    ("Salary", CategoryType::Income),
    ("Business Income", CategoryType::Income),
    ("Investments", CategoryType::Income),
    ("Freelance", CategoryType::Income),
    ("Gifts", CategoryType::Income),
    ("Other Income", CategoryType::Income),
    ("Housing", CategoryType::Expense),
    ("Utilities", CategoryType::Expense),
    ("Food & Groceries", CategoryType::Expense),
    ("Transportation", CategoryType::Expense),
    ("Healthcare", CategoryType::Expense),
    ("Education", CategoryType::Expense),
    ("Entertainment", CategoryType::Expense),
    ("Dining Out", CategoryType::Expense),
    ("Shopping", CategoryType::Expense),
    ("Personal Care", CategoryType::Expense),
    ("Gifts & Donations", CategoryType::Expense),
    ("Subscriptions", CategoryType::Expense),
    ("Insurance", CategoryType::Expense),
    ("Debt Payment", CategoryType::Expense),
    ("Savings", CategoryType::Expense),
    ("Investments", CategoryType::Expense),
    ("Taxes", CategoryType::Expense),
    ("Travel", CategoryType::Expense),
    ("Pets", CategoryType::Expense),
    ("Children", CategoryType::Expense),
    ("Other Expenses", CategoryType::Expense),
];

/// Inserts missing system categories and reactivates existing ones.
/// Returns `(created, refreshed)`.
pub fn seed_system(conn: &Connection, now: DateTime<Utc>) -> AppResult<(usize, usize)> {
    let mut created = 0;
    let mut refreshed = 0;
    for (name, kind) in SYSTEM_CATEGORIES {
        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM categories
                 WHERE user_id IS NULL AND is_system = 1 AND name = ?1 AND category_type = ?2",
                params![name, kind],
                |r| r.get(0),
            )
            .optional()?;
        match existing {
            Some(id) => {
                refreshed += conn.execute(
                    "UPDATE categories SET is_active = 1, updated_at = ?1
                     WHERE id = ?2 AND is_active = 0",
                    params![now, id],
                )?;
            }
            None => {
                conn.execute(
                    "INSERT INTO categories(id, user_id, name, category_type, parent_id, is_system,
                     is_active, created_at, updated_at) VALUES (?1, NULL, ?2, ?3, NULL, 1, 1, ?4, ?4)",
                    params![Uuid::new_v4().to_string(), name, kind, now],
                )?;
                created += 1;
            }
        }
    }
    tracing::info!(created, refreshed, "seeded system categories");
    Ok((created, refreshed))
}

fn visible_active(repo: &Repo) -> AppResult<Vec<Category>> {
    let mut q = ListQuery::new(Category::SELECT);
    q.and(VISIBLE, repo.user_id().to_string());
    q.and_raw("e.is_active = 1");
    q.order_by(None, ORDERING, "name")?;
    q.fetch_all(repo.conn())
}

fn nest(node: &mut Category, by_parent: &HashMap<Uuid, Vec<Category>>, depth: usize) {
    if depth >= MAX_DEPTH {
        return;
    }
    if let Some(kids) = by_parent.get(&node.id) {
        node.children = kids.clone();
        for child in node.children.iter_mut() {
            nest(child, by_parent, depth + 1);
        }
    }
}

/// Fills `children` with the caller-visible active subtree of each row.
pub fn attach_children(repo: &Repo, rows: &mut [Category]) -> AppResult<()> {
    let mut by_parent: HashMap<Uuid, Vec<Category>> = HashMap::new();
    for c in visible_active(repo)? {
        if let Some(parent) = c.parent_id {
            by_parent.entry(parent).or_default().push(c);
        }
    }
    for row in rows.iter_mut() {
        nest(row, &by_parent, 0);
    }
    Ok(())
}

pub fn get(repo: &Repo, id: Uuid) -> AppResult<Category> {
    let mut c = repo.get::<Category>(id)?;
    attach_children(repo, std::slice::from_mut(&mut c))?;
    Ok(c)
}

fn query(repo: &Repo, f: &CategoryFilter) -> AppResult<ListQuery> {
    let mut q = ListQuery::new(Category::SELECT);
    q.and(VISIBLE, repo.user_id().to_string());
    q.and_raw("e.is_active = 1");
    if let Some(t) = f.category_type {
        q.and("e.category_type = ?", t.as_str().to_string());
    }
    q.search(&["e.name"], f.search.as_deref());
    q.order_by(f.ordering.as_deref(), ORDERING, "name")?;
    Ok(q)
}

pub fn list(repo: &Repo, f: &CategoryFilter) -> AppResult<Vec<Category>> {
    let mut rows = query(repo, f)?.fetch_all(repo.conn())?;
    attach_children(repo, &mut rows)?;
    Ok(rows)
}

pub fn page(repo: &Repo, f: &CategoryFilter, spec: PageSpec) -> AppResult<Page<Category>> {
    let mut p = query(repo, f)?.fetch_page(repo.conn(), spec)?;
    attach_children(repo, &mut p.results)?;
    Ok(p)
}

/// A parent must be visible to the caller and must not sit below `id`.
fn check_parent(repo: &Repo, errors: &mut FieldErrors, id: Uuid, parent: Option<Uuid>) -> AppResult<()> {
    let mut cursor = parent;
    let mut hops = 0;
    while let Some(pid) = cursor {
        if pid == id {
            errors.push("parent_id", "A category cannot be its own ancestor.");
            return Ok(());
        }
        match repo.get::<Category>(pid) {
            Ok(p) => cursor = p.parent_id,
            Err(AppError::NotFound(_)) if hops == 0 => {
                errors.push("parent_id", "Category not found.");
                return Ok(());
            }
            Err(AppError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        }
        hops += 1;
        if hops > MAX_DEPTH {
            errors.push("parent_id", "Category nesting is too deep.");
            return Ok(());
        }
    }
    Ok(())
}

pub fn create(repo: &Repo, input: &NewCategory) -> AppResult<Category> {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let name = input.name.trim().to_string();
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "name", &name, 60, true);
    check_parent(repo, &mut errors, id, input.parent_id)?;
    errors.finish()?;

    repo.conn().execute(
        "INSERT INTO categories(id, user_id, name, category_type, parent_id, is_system, is_active,
         created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, 1, ?6, ?6)",
        params![
            id.to_string(),
            repo.user_id().to_string(),
            name,
            input.category_type,
            input.parent_id.map(|p| p.to_string()),
            now
        ],
    )?;
    tracing::info!(category_id = %id, "created category");
    get(repo, id)
}

pub fn update(repo: &Repo, id: Uuid, patch: &CategoryPatch) -> AppResult<Category> {
    let mut c = repo.get_for_write::<Category>(id)?;
    let mut errors = FieldErrors::new();
    if let Some(v) = &patch.name {
        c.name = v.trim().to_string();
    }
    if let Some(v) = patch.category_type {
        c.category_type = v;
    }
    if let Some(v) = patch.parent_id {
        check_parent(repo, &mut errors, id, Some(v))?;
        c.parent_id = Some(v);
    }
    if let Some(v) = patch.is_active {
        c.is_active = v;
    }
    check_text(&mut errors, "name", &c.name, 60, true);
    errors.finish()?;

    repo.conn().execute(
        "UPDATE categories SET name=?1, category_type=?2, parent_id=?3, is_active=?4, updated_at=?5
         WHERE id=?6",
        params![
            c.name,
            c.category_type,
            c.parent_id.map(|p| p.to_string()),
            c.is_active,
            Utc::now(),
            c.id.to_string()
        ],
    )?;
    get(repo, id)
}

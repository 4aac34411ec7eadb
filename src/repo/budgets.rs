// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budgets and their per-category allocations. An allocation has no owner
//! column of its own; it is owned through its budget.

use chrono::Utc;
use rusqlite::{Row, params};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{Entity, ListQuery, Ownership, Page, PageSpec, Repo};
use crate::db::{decimal_col, uuid_col};
use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{
    Budget, BudgetCategory, BudgetCategoryPatch, BudgetPatch, Category, NewBudget,
    NewBudgetCategory,
};
use crate::utils::{DEFAULT_CURRENCY, check_money, check_text, money, normalize_currency};

impl Entity for Budget {
    const KIND: &'static str = "Budget";
    const TABLE: &'static str = "budgets";
    const SELECT: &'static str = "SELECT e.id, e.user_id, e.name, e.total_amount, e.currency,
        e.start_date, e.end_date, e.is_active, e.created_at, e.updated_at FROM budgets e";

    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Budget {
            id: uuid_col(r, 0)?,
            user_id: uuid_col(r, 1)?,
            name: r.get(2)?,
            total_amount: decimal_col(r, 3)?,
            currency: r.get(4)?,
            start_date: r.get(5)?,
            end_date: r.get(6)?,
            is_active: r.get(7)?,
            categories: Vec::new(),
            created_at: r.get(8)?,
            updated_at: r.get(9)?,
        })
    }

    fn ownership(&self) -> Ownership {
        Ownership::User(self.user_id)
    }
}

impl Entity for BudgetCategory {
    const KIND: &'static str = "Budget category";
    const TABLE: &'static str = "budget_categories";
    const SELECT: &'static str = "SELECT e.id, e.budget_id, e.category_id, b.user_id,
        e.allocated_amount, e.alert_threshold, e.created_at, e.updated_at
        FROM budget_categories e JOIN budgets b ON b.id = e.budget_id";

    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(BudgetCategory {
            id: uuid_col(r, 0)?,
            budget_id: uuid_col(r, 1)?,
            category_id: uuid_col(r, 2)?,
            owner_id: uuid_col(r, 3)?,
            allocated_amount: decimal_col(r, 4)?,
            alert_threshold: decimal_col(r, 5)?,
            created_at: r.get(6)?,
            updated_at: r.get(7)?,
        })
    }

    fn ownership(&self) -> Ownership {
        Ownership::User(self.owner_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetFilter {
    pub currency: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetCategoryFilter {
    pub budget: Option<Uuid>,
    pub category: Option<Uuid>,
}

const ORDERING: &[(&str, &str)] = &[
    ("name", "e.name"),
    ("start_date", "e.start_date"),
    ("created_at", "e.created_at"),
];

fn default_threshold() -> Decimal {
    Decimal::new(80, 2)
}

fn validate(errors: &mut FieldErrors, b: &Budget) {
    check_text(errors, "name", &b.name, 100, true);
    check_money(errors, "total_amount", &b.total_amount);
    if b.total_amount < Decimal::ZERO {
        errors.push("total_amount", "Amount cannot be negative.");
    }
    if b.end_date < b.start_date {
        errors.push("end_date", "End date must be on or after the start date.");
    }
}

fn allocations(repo: &Repo, budget_id: Uuid) -> AppResult<Vec<BudgetCategory>> {
    let mut q = ListQuery::new(BudgetCategory::SELECT);
    q.and("e.budget_id = ?", budget_id.to_string());
    q.order_by(None, &[("created_at", "e.created_at")], "created_at")?;
    q.fetch_all(repo.conn())
}

pub fn attach_categories(repo: &Repo, rows: &mut [Budget]) -> AppResult<()> {
    for b in rows.iter_mut() {
        b.categories = allocations(repo, b.id)?;
    }
    Ok(())
}

pub fn get(repo: &Repo, id: Uuid) -> AppResult<Budget> {
    let mut b = repo.get::<Budget>(id)?;
    b.categories = allocations(repo, id)?;
    Ok(b)
}

fn query(repo: &Repo, f: &BudgetFilter) -> AppResult<ListQuery> {
    let mut q = ListQuery::new(Budget::SELECT);
    q.and("e.user_id = ?", repo.user_id().to_string());
    if let Some(c) = &f.currency {
        q.and("e.currency = ?", c.trim().to_uppercase());
    }
    if let Some(active) = f.is_active {
        q.and("e.is_active = ?", i64::from(active));
    }
    q.search(&["e.name"], f.search.as_deref());
    q.order_by(f.ordering.as_deref(), ORDERING, "-start_date")?;
    Ok(q)
}

pub fn list(repo: &Repo, f: &BudgetFilter) -> AppResult<Vec<Budget>> {
    let mut rows = query(repo, f)?.fetch_all(repo.conn())?;
    attach_categories(repo, &mut rows)?;
    Ok(rows)
}

pub fn page(repo: &Repo, f: &BudgetFilter, spec: PageSpec) -> AppResult<Page<Budget>> {
    let mut p = query(repo, f)?.fetch_page(repo.conn(), spec)?;
    attach_categories(repo, &mut p.results)?;
    Ok(p)
}

pub fn create(repo: &Repo, input: &NewBudget) -> AppResult<Budget> {
    let now = Utc::now();
    let mut errors = FieldErrors::new();
    let currency = normalize_currency(
        &mut errors,
        "currency",
        input.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
    );
    let b = Budget {
        id: Uuid::new_v4(),
        user_id: repo.user_id(),
        name: input.name.trim().to_string(),
        total_amount: input.total_amount,
        currency,
        start_date: input.start_date,
        end_date: input.end_date,
        is_active: true,
        categories: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    validate(&mut errors, &b);
    errors.finish()?;

    repo.conn().execute(
        "INSERT INTO budgets(id, user_id, name, total_amount, currency, start_date, end_date,
         is_active, created_at, updated_at) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            b.id.to_string(),
            b.user_id.to_string(),
            b.name,
            money(b.total_amount).to_string(),
            b.currency,
            b.start_date,
            b.end_date,
            b.is_active,
            b.created_at,
            b.updated_at
        ],
    )?;
    tracing::info!(budget_id = %b.id, "created budget");
    get(repo, b.id)
}

pub fn update(repo: &Repo, id: Uuid, patch: &BudgetPatch) -> AppResult<Budget> {
    let mut b = repo.get_for_write::<Budget>(id)?;
    let mut errors = FieldErrors::new();
    if let Some(v) = &patch.name {
        b.name = v.trim().to_string();
    }
    if let Some(v) = patch.total_amount {
        b.total_amount = v;
    }
    if let Some(v) = &patch.currency {
        b.currency = normalize_currency(&mut errors, "currency", v);
    }
    if let Some(v) = patch.start_date {
        b.start_date = v;
    }
    if let Some(v) = patch.end_date {
        b.end_date = v;
    }
    if let Some(v) = patch.is_active {
        b.is_active = v;
    }
    validate(&mut errors, &b);
    errors.finish()?;

    repo.conn().execute(
        "UPDATE budgets SET name=?1, total_amount=?2, currency=?3, start_date=?4, end_date=?5,
         is_active=?6, updated_at=?7 WHERE id=?8",
        params![
            b.name,
            money(b.total_amount).to_string(),
            b.currency,
            b.start_date,
            b.end_date,
            b.is_active,
            Utc::now(),
            b.id.to_string()
        ],
    )?;
    get(repo, id)
}

fn validate_allocation(errors: &mut FieldErrors, bc: &BudgetCategory) {
    check_money(errors, "allocated_amount", &bc.allocated_amount);
    if bc.allocated_amount < Decimal::ZERO {
        errors.push("allocated_amount", "Amount cannot be negative.");
    }
    if bc.alert_threshold < Decimal::ZERO || bc.alert_threshold > Decimal::ONE {
        errors.push("alert_threshold", "Threshold must be between 0 and 1.");
    }
    if bc.alert_threshold.round_dp(2) != bc.alert_threshold {
        errors.push("alert_threshold", "Ensure that there are no more than 2 decimal places.");
    }
}

fn check_category(
    repo: &Repo,
    errors: &mut FieldErrors,
    budget_id: Uuid,
    category_id: Uuid,
    skip: Option<Uuid>,
) -> AppResult<()> {
    match repo.get::<Category>(category_id) {
        Ok(_) => {}
        Err(AppError::NotFound(_)) => {
            errors.push("category_id", "Category not found.");
            return Ok(());
        }
        Err(e) => return Err(e),
    }
    let taken = allocations(repo, budget_id)?
        .iter()
        .any(|bc| bc.category_id == category_id && Some(bc.id) != skip);
    if taken {
        errors.push("category_id", "This category is already allocated in the budget.");
    }
    Ok(())
}

fn allocation_query(repo: &Repo, f: &BudgetCategoryFilter) -> AppResult<ListQuery> {
    let mut q = ListQuery::new(BudgetCategory::SELECT);
    q.and("b.user_id = ?", repo.user_id().to_string());
    if let Some(b) = f.budget {
        q.and("e.budget_id = ?", b.to_string());
    }
    if let Some(c) = f.category {
        q.and("e.category_id = ?", c.to_string());
    }
    q.order_by(None, &[("created_at", "e.created_at")], "created_at")?;
    Ok(q)
}

pub fn page_allocations(
    repo: &Repo,
    f: &BudgetCategoryFilter,
    spec: PageSpec,
) -> AppResult<Page<BudgetCategory>> {
    allocation_query(repo, f)?.fetch_page(repo.conn(), spec)
}

pub fn create_allocation(repo: &Repo, input: &NewBudgetCategory) -> AppResult<BudgetCategory> {
    let now = Utc::now();
    let mut errors = FieldErrors::new();
    match repo.get_for_write::<Budget>(input.budget_id) {
        Ok(_) => check_category(repo, &mut errors, input.budget_id, input.category_id, None)?,
        Err(AppError::NotFound(_)) => errors.push("budget_id", "Budget does not belong to you."),
        Err(e) => return Err(e),
    }
    let bc = BudgetCategory {
        id: Uuid::new_v4(),
        budget_id: input.budget_id,
        category_id: input.category_id,
        owner_id: repo.user_id(),
        allocated_amount: input.allocated_amount,
        alert_threshold: input.alert_threshold.unwrap_or_else(default_threshold),
        created_at: now,
        updated_at: now,
    };
    validate_allocation(&mut errors, &bc);
    errors.finish()?;

    repo.conn().execute(
        "INSERT INTO budget_categories(id, budget_id, category_id, allocated_amount,
         alert_threshold, created_at, updated_at) VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            bc.id.to_string(),
            bc.budget_id.to_string(),
            bc.category_id.to_string(),
            money(bc.allocated_amount).to_string(),
            money(bc.alert_threshold).to_string(),
            bc.created_at,
            bc.updated_at
        ],
    )?;
    tracing::info!(budget_category_id = %bc.id, budget_id = %bc.budget_id, "allocated budget category");
    repo.get::<BudgetCategory>(bc.id)
}

pub fn update_allocation(
    repo: &Repo,
    id: Uuid,
    patch: &BudgetCategoryPatch,
) -> AppResult<BudgetCategory> {
    let mut bc = repo.get_for_write::<BudgetCategory>(id)?;
    let mut errors = FieldErrors::new();
    if let Some(c) = patch.category_id {
        check_category(repo, &mut errors, bc.budget_id, c, Some(bc.id))?;
        bc.category_id = c;
    }
    if let Some(v) = patch.allocated_amount {
        bc.allocated_amount = v;
    }
    if let Some(v) = patch.alert_threshold {
        bc.alert_threshold = v;
    }
    validate_allocation(&mut errors, &bc);
    errors.finish()?;

    repo.conn().execute(
        "UPDATE budget_categories SET category_id=?1, allocated_amount=?2, alert_threshold=?3,
         updated_at=?4 WHERE id=?5",
        params![
            bc.category_id.to_string(),
            money(bc.allocated_amount).to_string(),
            money(bc.alert_threshold).to_string(),
            Utc::now(),
            bc.id.to_string()
        ],
    )?;
    repo.get::<BudgetCategory>(id)
}

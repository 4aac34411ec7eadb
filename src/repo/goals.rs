// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rusqlite::{Row, params};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{Entity, ListQuery, Ownership, Page, PageSpec, Repo};
use crate::db::{decimal_col, uuid_col};
use crate::error::{AppResult, FieldErrors};
use crate::models::{Goal, GoalPatch, GoalType, NewGoal};
use crate::utils::{
    DEFAULT_CURRENCY, check_money, check_text, money, normalize_currency, percentage,
};

impl Entity for Goal {
    const KIND: &'static str = "Goal";
    const TABLE: &'static str = "goals";
    const SELECT: &'static str = "SELECT e.id, e.user_id, e.name, e.target_amount,
        e.current_amount, e.currency, e.deadline, e.goal_type, e.is_achieved, e.created_at,
        e.updated_at FROM goals e";

    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        let target_amount = decimal_col(r, 3)?;
        let current_amount = decimal_col(r, 4)?;
        Ok(Goal {
            id: uuid_col(r, 0)?,
            user_id: uuid_col(r, 1)?,
            name: r.get(2)?,
            target_amount,
            current_amount,
            currency: r.get(5)?,
            deadline: r.get(6)?,
            goal_type: r.get(7)?,
            is_achieved: r.get(8)?,
            progress_percentage: progress(current_amount, target_amount),
            created_at: r.get(9)?,
            updated_at: r.get(10)?,
        })
    }

    fn ownership(&self) -> Ownership {
        Ownership::User(self.user_id)
    }
}

/// Not capped: an overfunded goal reports more than 100.
pub fn progress(current: Decimal, target: Decimal) -> Decimal {
    if target <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    percentage(current, target)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalFilter {
    pub goal_type: Option<GoalType>,
    pub currency: Option<String>,
    pub is_achieved: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

const ORDERING: &[(&str, &str)] = &[
    ("name", "e.name"),
    ("deadline", "e.deadline"),
    ("created_at", "e.created_at"),
];

fn validate(errors: &mut FieldErrors, g: &Goal) {
    check_text(errors, "name", &g.name, 120, true);
    check_money(errors, "target_amount", &g.target_amount);
    check_money(errors, "current_amount", &g.current_amount);
    if g.target_amount < Decimal::ZERO {
        errors.push("target_amount", "Amount cannot be negative.");
    }
    if g.current_amount < Decimal::ZERO {
        errors.push("current_amount", "Amount cannot be negative.");
    }
}

fn query(repo: &Repo, f: &GoalFilter) -> AppResult<ListQuery> {
    let mut q = ListQuery::new(Goal::SELECT);
    q.and("e.user_id = ?", repo.user_id().to_string());
    if let Some(t) = f.goal_type {
        q.and("e.goal_type = ?", t.as_str().to_string());
    }
    if let Some(c) = &f.currency {
        q.and("e.currency = ?", c.trim().to_uppercase());
    }
    if let Some(done) = f.is_achieved {
        q.and("e.is_achieved = ?", i64::from(done));
    }
    q.search(&["e.name"], f.search.as_deref());
    q.order_by(f.ordering.as_deref(), ORDERING, "deadline")?;
    Ok(q)
}

pub fn list(repo: &Repo, f: &GoalFilter) -> AppResult<Vec<Goal>> {
    query(repo, f)?.fetch_all(repo.conn())
}

pub fn page(repo: &Repo, f: &GoalFilter, spec: PageSpec) -> AppResult<Page<Goal>> {
    query(repo, f)?.fetch_page(repo.conn(), spec)
}

pub fn create(repo: &Repo, input: &NewGoal) -> AppResult<Goal> {
    let now = Utc::now();
    let mut errors = FieldErrors::new();
    let currency = normalize_currency(
        &mut errors,
        "currency",
        input.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
    );
    let current_amount = input.current_amount.unwrap_or(Decimal::ZERO);
    let g = Goal {
        id: Uuid::new_v4(),
        user_id: repo.user_id(),
        name: input.name.trim().to_string(),
        target_amount: input.target_amount,
        current_amount,
        currency,
        deadline: input.deadline,
        goal_type: input.goal_type,
        is_achieved: false,
        progress_percentage: progress(current_amount, input.target_amount),
        created_at: now,
        updated_at: now,
    };
    validate(&mut errors, &g);
    errors.finish()?;

    repo.conn().execute(
        "INSERT INTO goals(id, user_id, name, target_amount, current_amount, currency, deadline,
         goal_type, is_achieved, created_at, updated_at) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
        params![
            g.id.to_string(),
            g.user_id.to_string(),
            g.name,
            money(g.target_amount).to_string(),
            money(g.current_amount).to_string(),
            g.currency,
            g.deadline,
            g.goal_type,
            g.is_achieved,
            g.created_at,
            g.updated_at
        ],
    )?;
    tracing::info!(goal_id = %g.id, "created goal");
    repo.get::<Goal>(g.id)
}

pub fn update(repo: &Repo, id: Uuid, patch: &GoalPatch) -> AppResult<Goal> {
    let mut g = repo.get_for_write::<Goal>(id)?;
    let mut errors = FieldErrors::new();
    if let Some(v) = &patch.name {
        g.name = v.trim().to_string();
    }
    if let Some(v) = patch.target_amount {
        g.target_amount = v;
    }
    if let Some(v) = patch.current_amount {
        g.current_amount = v;
    }
    if let Some(v) = &patch.currency {
        g.currency = normalize_currency(&mut errors, "currency", v);
    }
    if let Some(v) = patch.goal_type {
        g.goal_type = v;
    }
    if let Some(v) = patch.deadline {
        g.deadline = Some(v);
    }
    if let Some(v) = patch.is_achieved {
        g.is_achieved = v;
    }
    validate(&mut errors, &g);
    errors.finish()?;

    repo.conn().execute(
        "UPDATE goals SET name=?1, target_amount=?2, current_amount=?3, currency=?4, deadline=?5,
         goal_type=?6, is_achieved=?7, updated_at=?8 WHERE id=?9",
        params![
            g.name,
            money(g.target_amount).to_string(),
            money(g.current_amount).to_string(),
            g.currency,
            g.deadline,
            g.goal_type,
            g.is_achieved,
            Utc::now(),
            g.id.to_string()
        ],
    )?;
    repo.get::<Goal>(id)
}

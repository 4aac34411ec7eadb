// Copyright (c) 2025 Soumyadip Sarkar.
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
use crate::models::{Account, AccountPatch, AccountType, NewAccount};
use crate::utils::{DEFAULT_CURRENCY, check_money, check_text, money, normalize_currency};

impl Entity for Account {
    const KIND: &'static str = "Account";
    const TABLE: &'static str = "accounts";
    const SELECT: &'static str = "SELECT e.id, e.user_id, e.name, e.account_type, e.currency,
        e.balance, e.institution, e.is_active, e.created_at, e.updated_at FROM accounts e";

    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Account {
            id: uuid_col(r, 0)?,
            user_id: uuid_col(r, 1)?,
            name: r.get(2)?,
            account_type: r.get(3)?,
            currency: r.get(4)?,
            balance: decimal_col(r, 5)?,
            institution: r.get(6)?,
            is_active: r.get(7)?,
            created_at: r.get(8)?,
            updated_at: r.get(9)?,
        })
    }

    fn ownership(&self) -> Ownership {
        Ownership::User(self.user_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    pub account_type: Option<AccountType>,
    pub currency: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

const ORDERING: &[(&str, &str)] = &[
    ("name", "e.name"),
    ("balance", "CAST(e.balance AS REAL)"),
    ("created_at", "e.created_at"),
];

fn validate(errors: &mut FieldErrors, a: &Account) {
    check_text(errors, "name", &a.name, 100, true);
    check_text(errors, "institution", &a.institution, 120, false);
    check_money(errors, "balance", &a.balance);
}

pub fn create(repo: &Repo, input: &NewAccount) -> AppResult<Account> {
    let now = Utc::now();
    let mut errors = FieldErrors::new();
    let currency = normalize_currency(
        &mut errors,
        "currency",
        input.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
    );
    let account = Account {
        id: Uuid::new_v4(),
        user_id: repo.user_id(),
        name: input.name.trim().to_string(),
        account_type: input.account_type,
        currency,
        balance: input.balance.unwrap_or(Decimal::ZERO),
        institution: input.institution.clone().unwrap_or_default(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    validate(&mut errors, &account);
    errors.finish()?;

    repo.conn().execute(
        "INSERT INTO accounts(id, user_id, name, account_type, currency, balance, institution,
         is_active, created_at, updated_at) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            account.id.to_string(),
            account.user_id.to_string(),
            account.name,
            account.account_type,
            account.currency,
            money(account.balance).to_string(),
            account.institution,
            account.is_active,
            account.created_at,
            account.updated_at
        ],
    )?;
    tracing::info!(account_id = %account.id, "created account");
    repo.get::<Account>(account.id)
}

fn query(repo: &Repo, f: &AccountFilter) -> AppResult<ListQuery> {
    let mut q = ListQuery::new(Account::SELECT);
    q.and("e.user_id = ?", repo.user_id().to_string());
    if let Some(t) = f.account_type {
        q.and("e.account_type = ?", t.as_str().to_string());
    }
    if let Some(c) = &f.currency {
        q.and("e.currency = ?", c.trim().to_uppercase());
    }
    if let Some(active) = f.is_active {
        q.and("e.is_active = ?", i64::from(active));
    }
    q.search(&["e.name", "e.institution"], f.search.as_deref());
    q.order_by(f.ordering.as_deref(), ORDERING, "-created_at")?;
    Ok(q)
}

pub fn list(repo: &Repo, f: &AccountFilter) -> AppResult<Vec<Account>> {
    query(repo, f)?.fetch_all(repo.conn())
}

pub fn page(repo: &Repo, f: &AccountFilter, spec: PageSpec) -> AppResult<Page<Account>> {
    query(repo, f)?.fetch_page(repo.conn(), spec)
}

pub fn update(repo: &Repo, id: Uuid, patch: &AccountPatch) -> AppResult<Account> {
    let mut a = repo.get_for_write::<Account>(id)?;
    let mut errors = FieldErrors::new();
    if let Some(v) = &patch.name {
        a.name = v.trim().to_string();
    }
    if let Some(v) = patch.account_type {
        a.account_type = v;
    }
    if let Some(v) = &patch.currency {
        a.currency = normalize_currency(&mut errors, "currency", v);
    }
    if let Some(v) = patch.balance {
        a.balance = v;
    }
    if let Some(v) = &patch.institution {
        a.institution = v.clone();
    }
    if let Some(v) = patch.is_active {
        a.is_active = v;
    }
    validate(&mut errors, &a);
    errors.finish()?;

    repo.conn().execute(
        "UPDATE accounts SET name=?1, account_type=?2, currency=?3, balance=?4, institution=?5,
         is_active=?6, updated_at=?7 WHERE id=?8",
        params![
            a.name,
            a.account_type,
            a.currency,
            money(a.balance).to_string(),
            a.institution,
            a.is_active,
            Utc::now(),
            a.id.to_string()
        ],
    )?;
    repo.get::<Account>(id)
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, Utc};
use rusqlite::{Row, params};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{Entity, ListQuery, Ownership, Page, PageSpec, Repo};
use crate::db::{decimal_col, opt_uuid_col, uuid_col};
use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{
    Account, Category, NewTransaction, PaymentMethod, Transaction, TransactionDetail,
    TransactionPatch, TransactionType,
};
use crate::utils::{check_money, check_text, money, normalize_currency};

impl Entity for Transaction {
    const KIND: &'static str = "Transaction";
    const TABLE: &'static str = "transactions";
    const SELECT: &'static str = "SELECT e.id, e.user_id, e.account_id, e.category_id, e.amount,
        e.currency, e.transaction_type, e.date, e.description, e.notes, e.payment_method,
        e.created_at, e.updated_at FROM transactions e";

    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Transaction {
            id: uuid_col(r, 0)?,
            user_id: uuid_col(r, 1)?,
            account_id: uuid_col(r, 2)?,
            category_id: opt_uuid_col(r, 3)?,
            amount: decimal_col(r, 4)?,
            currency: r.get(5)?,
            transaction_type: r.get(6)?,
            date: r.get(7)?,
            description: r.get(8)?,
            notes: r.get(9)?,
            payment_method: r.get(10)?,
            created_at: r.get(11)?,
            updated_at: r.get(12)?,
        })
    }

    fn ownership(&self) -> Ownership {
        Ownership::User(self.user_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub currency: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub account: Option<Uuid>,
    pub category: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

const ORDERING: &[(&str, &str)] = &[
    ("date", "e.date"),
    ("amount", "CAST(e.amount AS REAL)"),
    ("created_at", "e.created_at"),
];

fn query(repo: &Repo, f: &TransactionFilter) -> AppResult<ListQuery> {
    let mut q = ListQuery::new(Transaction::SELECT);
    q.and("e.user_id = ?", repo.user_id().to_string());
    if let Some(t) = f.transaction_type {
        q.and("e.transaction_type = ?", t.as_str().to_string());
    }
    if let Some(c) = &f.currency {
        q.and("e.currency = ?", c.trim().to_uppercase());
    }
    if let Some(p) = f.payment_method {
        q.and("e.payment_method = ?", p.as_str().to_string());
    }
    if let Some(a) = f.account {
        q.and("e.account_id = ?", a.to_string());
    }
    if let Some(c) = f.category {
        q.and("e.category_id = ?", c.to_string());
    }
    if let Some(d) = f.date_from {
        q.and("e.date >= ?", d.to_string());
    }
    if let Some(d) = f.date_to {
        q.and("e.date <= ?", d.to_string());
    }
    if let Some(a) = f.amount_min {
        q.and("CAST(e.amount AS REAL) >= CAST(? AS REAL)", a.to_string());
    }
    if let Some(a) = f.amount_max {
        q.and("CAST(e.amount AS REAL) <= CAST(? AS REAL)", a.to_string());
    }
    q.search(&["e.description", "e.notes"], f.search.as_deref());
    q.order_by(f.ordering.as_deref(), ORDERING, "-date,-created_at")?;
    Ok(q)
}

pub fn list(repo: &Repo, f: &TransactionFilter) -> AppResult<Vec<Transaction>> {
    query(repo, f)?.fetch_all(repo.conn())
}

pub fn page(repo: &Repo, f: &TransactionFilter, spec: PageSpec) -> AppResult<Page<Transaction>> {
    query(repo, f)?.fetch_page(repo.conn(), spec)
}

/// Inlines the account and category through the read gate. A related row the
/// caller cannot see comes back as `None`.
pub fn detail(repo: &Repo, tx: Transaction) -> AppResult<TransactionDetail> {
    let account_detail = visible(repo.get::<Account>(tx.account_id))?;
    let category_detail = match tx.category_id {
        Some(id) => visible(super::categories::get(repo, id))?,
        None => None,
    };
    Ok(TransactionDetail {
        transaction: tx,
        account_detail,
        category_detail,
    })
}

pub fn page_detailed(
    repo: &Repo,
    f: &TransactionFilter,
    spec: PageSpec,
) -> AppResult<Page<TransactionDetail>> {
    page(repo, f, spec)?.try_map(|tx| detail(repo, tx))
}

fn visible<T>(found: AppResult<T>) -> AppResult<Option<T>> {
    match found {
        Ok(row) => Ok(Some(row)),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// All of the caller's transactions dated within `[from, to]`.
pub fn in_range(repo: &Repo, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Transaction>> {
    list(
        repo,
        &TransactionFilter {
            date_from: Some(from),
            date_to: Some(to),
            ordering: Some("date".to_string()),
            ..Default::default()
        },
    )
}

/// Resolves the account through the read gate; a hidden account is a field
/// problem on the submitted id, not a missing resource.
fn owned_account(repo: &Repo, errors: &mut FieldErrors, id: Uuid) -> AppResult<Option<Account>> {
    match repo.get::<Account>(id) {
        Ok(a) => Ok(Some(a)),
        Err(AppError::NotFound(_)) => {
            errors.push("account_id", "Account does not belong to you.");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn visible_category(repo: &Repo, errors: &mut FieldErrors, id: Uuid) -> AppResult<()> {
    match repo.get::<Category>(id) {
        Ok(_) => Ok(()),
        Err(AppError::NotFound(_)) => {
            errors.push("category_id", "Category not found.");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn validate(errors: &mut FieldErrors, t: &Transaction) {
    if t.amount <= Decimal::ZERO {
        errors.push("amount", "Amount must be greater than zero.");
    }
    check_money(errors, "amount", &t.amount);
    check_text(errors, "description", &t.description, 255, false);
}

pub fn create(repo: &Repo, input: &NewTransaction) -> AppResult<Transaction> {
    let now = Utc::now();
    let mut errors = FieldErrors::new();
    let account = owned_account(repo, &mut errors, input.account_id)?;
    if let Some(c) = input.category_id {
        visible_category(repo, &mut errors, c)?;
    }
    let currency = match (&input.currency, &account) {
        (Some(c), _) => normalize_currency(&mut errors, "currency", c),
        (None, Some(a)) => a.currency.clone(),
        (None, None) => String::new(),
    };
    let t = Transaction {
        id: Uuid::new_v4(),
        user_id: repo.user_id(),
        account_id: input.account_id,
        category_id: input.category_id,
        amount: input.amount,
        currency,
        transaction_type: input.transaction_type,
        date: input.date.unwrap_or_else(|| now.date_naive()),
        description: input.description.clone().unwrap_or_default(),
        notes: input.notes.clone().unwrap_or_default(),
        payment_method: input.payment_method,
        created_at: now,
        updated_at: now,
    };
    validate(&mut errors, &t);
    errors.finish()?;

    repo.conn().execute(
        "INSERT INTO transactions(id, user_id, account_id, category_id, amount, currency,
         transaction_type, date, description, notes, payment_method, created_at, updated_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
        params![
            t.id.to_string(),
            t.user_id.to_string(),
            t.account_id.to_string(),
            t.category_id.map(|c| c.to_string()),
            money(t.amount).to_string(),
            t.currency,
            t.transaction_type,
            t.date,
            t.description,
            t.notes,
            t.payment_method,
            t.created_at,
            t.updated_at
        ],
    )?;
    tracing::info!(transaction_id = %t.id, account_id = %t.account_id, "recorded transaction");
    repo.get::<Transaction>(t.id)
}

pub fn update(repo: &Repo, id: Uuid, patch: &TransactionPatch) -> AppResult<Transaction> {
    let mut t = repo.get_for_write::<Transaction>(id)?;
    let mut errors = FieldErrors::new();
    if let Some(a) = patch.account_id {
        owned_account(repo, &mut errors, a)?;
        t.account_id = a;
    }
    if let Some(c) = patch.category_id {
        visible_category(repo, &mut errors, c)?;
        t.category_id = Some(c);
    }
    if let Some(v) = patch.amount {
        t.amount = v;
    }
    if let Some(v) = &patch.currency {
        t.currency = normalize_currency(&mut errors, "currency", v);
    }
    if let Some(v) = patch.transaction_type {
        t.transaction_type = v;
    }
    if let Some(v) = patch.date {
        t.date = v;
    }
    if let Some(v) = &patch.description {
        t.description = v.clone();
    }
    if let Some(v) = &patch.notes {
        t.notes = v.clone();
    }
    if let Some(v) = patch.payment_method {
        t.payment_method = v;
    }
    validate(&mut errors, &t);
    errors.finish()?;

    repo.conn().execute(
        "UPDATE transactions SET account_id=?1, category_id=?2, amount=?3, currency=?4,
         transaction_type=?5, date=?6, description=?7, notes=?8, payment_method=?9, updated_at=?10
         WHERE id=?11",
        params![
            t.account_id.to_string(),
            t.category_id.map(|c| c.to_string()),
            money(t.amount).to_string(),
            t.currency,
            t.transaction_type,
            t.date,
            t.description,
            t.notes,
            t.payment_method,
            Utc::now(),
            t.id.to_string()
        ],
    )?;
    repo.get::<Transaction>(id)
}

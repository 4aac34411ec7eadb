// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only aggregations over the caller's rows. Sums are computed in
//! `Decimal`, never in SQL floating point.

use async_graphql::SimpleObject;
use chrono::{Duration, NaiveDate};
use rusqlite::params;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::db::uuid_col;
use crate::error::{AppError, AppResult};
use crate::models::{Account, Budget, Transaction, TransactionType};
use crate::repo::accounts::{self, AccountFilter};
use crate::repo::transactions::{self, TransactionFilter};
use crate::repo::{Repo, budgets};
use crate::utils::{money, month_key, percentage};

pub const DEFAULT_DAYS: i64 = 30;
pub const DEFAULT_MONTHS: i64 = 6;
const MAX_DAYS: i64 = 3660;
const MAX_MONTHS: i64 = 120;
const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DaysWindow {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MonthsWindow {
    pub months: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub total: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct IncomeVsExpenses {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    pub savings_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct CurrencyTotal {
    pub currency: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct NetWorth {
    pub by_currency: Vec<CurrencyTotal>,
    pub accounts_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct TransactionSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct BudgetCategoryUsage {
    pub budget_category_id: Uuid,
    pub category_id: Uuid,
    pub category: String,
    pub allocated_amount: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percentage_used: Decimal,
    pub alert_threshold: Decimal,
    pub alert_triggered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct BudgetSummary {
    pub budget_id: Uuid,
    pub name: String,
    pub currency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_amount: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percentage_used: Decimal,
    pub categories: Vec<BudgetCategoryUsage>,
}

pub fn window_days(days: Option<i64>) -> AppResult<i64> {
    let days = days.unwrap_or(DEFAULT_DAYS);
    if !(1..=MAX_DAYS).contains(&days) {
        return Err(AppError::invalid(
            "days",
            format!("Must be between 1 and {}.", MAX_DAYS),
        ));
    }
    Ok(days)
}

pub fn window_months(months: Option<i64>) -> AppResult<i64> {
    let months = months.unwrap_or(DEFAULT_MONTHS);
    if !(1..=MAX_MONTHS).contains(&months) {
        return Err(AppError::invalid(
            "months",
            format!("Must be between 1 and {}.", MAX_MONTHS),
        ));
    }
    Ok(months)
}

/// Caller transactions dated on or after `today - days`.
fn since(
    repo: &Repo,
    today: NaiveDate,
    days: i64,
    kind: Option<TransactionType>,
) -> AppResult<Vec<Transaction>> {
    transactions::list(
        repo,
        &TransactionFilter {
            transaction_type: kind,
            date_from: Some(today - Duration::days(days)),
            ordering: Some("date".to_string()),
            ..Default::default()
        },
    )
}

fn sum_of(rows: &[Transaction], kind: TransactionType) -> Decimal {
    rows.iter()
        .filter(|t| t.transaction_type == kind)
        .map(|t| t.amount)
        .sum()
}

/// Names of every category the caller can see, inactive ones included.
fn category_names(repo: &Repo) -> AppResult<HashMap<Uuid, String>> {
    let mut stmt = repo
        .conn()
        .prepare("SELECT id, name FROM categories WHERE user_id = ?1 OR is_system = 1")?;
    let rows = stmt.query_map(params![repo.user_id().to_string()], |r| {
        Ok((uuid_col(r, 0)?, r.get::<_, String>(1)?))
    })?;
    let mut out = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        out.insert(id, name);
    }
    Ok(out)
}

pub fn spending_trends(repo: &Repo, today: NaiveDate, days: Option<i64>) -> AppResult<Vec<DailyTotal>> {
    let days = window_days(days)?;
    let mut by_day: BTreeMap<NaiveDate, (Decimal, i64)> = BTreeMap::new();
    for t in since(repo, today, days, Some(TransactionType::Expense))? {
        let slot = by_day.entry(t.date).or_insert((Decimal::ZERO, 0));
        slot.0 += t.amount;
        slot.1 += 1;
    }
    Ok(by_day
        .into_iter()
        .map(|(day, (total, count))| DailyTotal {
            day,
            total: money(total),
            count,
        })
        .collect())
}

/// Groups by category name, largest total first.
pub fn totals_by_category(repo: &Repo, rows: &[Transaction]) -> AppResult<Vec<CategoryTotal>> {
    let names = category_names(repo)?;
    let mut grouped: HashMap<String, (Decimal, i64)> = HashMap::new();
    for t in rows {
        let name = t
            .category_id
            .and_then(|c| names.get(&c).cloned())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let slot = grouped.entry(name).or_insert((Decimal::ZERO, 0));
        slot.0 += t.amount;
        slot.1 += 1;
    }
    let mut out: Vec<CategoryTotal> = grouped
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category,
            total: money(total),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    Ok(out)
}

pub fn category_breakdown(
    repo: &Repo,
    today: NaiveDate,
    days: Option<i64>,
) -> AppResult<Vec<CategoryTotal>> {
    let days = window_days(days)?;
    let rows = since(repo, today, days, Some(TransactionType::Expense))?;
    totals_by_category(repo, &rows)
}

pub fn income_vs_expenses(
    repo: &Repo,
    today: NaiveDate,
    days: Option<i64>,
) -> AppResult<IncomeVsExpenses> {
    let days = window_days(days)?;
    let rows = since(repo, today, days, None)?;
    let income = sum_of(&rows, TransactionType::Income);
    let expenses = sum_of(&rows, TransactionType::Expense);
    let net = income - expenses;
    let savings_rate = if income > Decimal::ZERO {
        percentage(net, income)
    } else {
        Decimal::ZERO
    };
    Ok(IncomeVsExpenses {
        income: money(income),
        expenses: money(expenses),
        net: money(net),
        savings_rate,
    })
}

pub fn net_worth(repo: &Repo) -> AppResult<NetWorth> {
    let active: Vec<Account> = accounts::list(
        repo,
        &AccountFilter {
            is_active: Some(true),
            ..Default::default()
        },
    )?;
    let mut by_currency: BTreeMap<String, Decimal> = BTreeMap::new();
    for a in &active {
        *by_currency.entry(a.currency.clone()).or_insert(Decimal::ZERO) += a.balance;
    }
    Ok(NetWorth {
        by_currency: by_currency
            .into_iter()
            .map(|(currency, total)| CurrencyTotal {
                currency,
                total: money(total),
            })
            .collect(),
        accounts_count: active.len() as i64,
    })
}

/// Months are approximated as 30 days for the window start.
pub fn monthly_summary(
    repo: &Repo,
    today: NaiveDate,
    months: Option<i64>,
) -> AppResult<Vec<MonthlySummary>> {
    let months = window_months(months)?;
    let mut by_month: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for t in since(repo, today, months * 30, None)? {
        let slot = by_month
            .entry(month_key(t.date))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        match t.transaction_type {
            TransactionType::Income => slot.0 += t.amount,
            TransactionType::Expense => slot.1 += t.amount,
        }
    }
    Ok(by_month
        .into_iter()
        .map(|(month, (income, expenses))| MonthlySummary {
            month,
            income: money(income),
            expenses: money(expenses),
            net: money(income - expenses),
        })
        .collect())
}

pub fn transaction_summary(rows: &[Transaction]) -> TransactionSummary {
    let income = sum_of(rows, TransactionType::Income);
    let expenses = sum_of(rows, TransactionType::Expense);
    TransactionSummary {
        total_income: money(income),
        total_expenses: money(expenses),
        net: money(income - expenses),
    }
}

fn budget_usage(repo: &Repo, budget: &Budget) -> AppResult<BudgetSummary> {
    let names = category_names(repo)?;
    let expenses: Vec<Transaction> = transactions::in_range(repo, budget.start_date, budget.end_date)?
        .into_iter()
        .filter(|t| t.transaction_type == TransactionType::Expense)
        .collect();
    let spent: Decimal = expenses.iter().map(|t| t.amount).sum();

    let mut categories = Vec::with_capacity(budget.categories.len());
    for bc in &budget.categories {
        let cat_spent: Decimal = expenses
            .iter()
            .filter(|t| t.category_id == Some(bc.category_id))
            .map(|t| t.amount)
            .sum();
        let pct = percentage(cat_spent, bc.allocated_amount);
        categories.push(BudgetCategoryUsage {
            budget_category_id: bc.id,
            category_id: bc.category_id,
            category: names
                .get(&bc.category_id)
                .cloned()
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            allocated_amount: money(bc.allocated_amount),
            spent: money(cat_spent),
            remaining: money(bc.allocated_amount - cat_spent),
            percentage_used: pct,
            alert_threshold: bc.alert_threshold,
            alert_triggered: !bc.allocated_amount.is_zero()
                && pct >= bc.alert_threshold * Decimal::ONE_HUNDRED,
        });
    }

    Ok(BudgetSummary {
        budget_id: budget.id,
        name: budget.name.clone(),
        currency: budget.currency.clone(),
        start_date: budget.start_date,
        end_date: budget.end_date,
        total_amount: money(budget.total_amount),
        spent: money(spent),
        remaining: money(budget.total_amount - spent),
        percentage_used: percentage(spent, budget.total_amount),
        categories,
    })
}

pub fn budget_summary(repo: &Repo, budget_id: Uuid) -> AppResult<BudgetSummary> {
    let budget = budgets::get(repo, budget_id)?;
    budget_usage(repo, &budget)
}

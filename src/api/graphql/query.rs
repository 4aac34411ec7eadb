// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use async_graphql::{Context, Object, Result};
use chrono::Utc;
use uuid::Uuid;

use super::{resolve, resolve_opt};
use crate::models::{
    Account, Budget, BudgetCategory, Category, CategoryType, Goal, Notification, Transaction,
    TransactionType, User,
};
use crate::reports::{
    self, BudgetSummary, CategoryTotal, DailyTotal, IncomeVsExpenses, MonthlySummary, NetWorth,
};
use crate::repo::accounts::{self, AccountFilter};
use crate::repo::budgets::{self, BudgetFilter};
use crate::repo::categories::{self, CategoryFilter};
use crate::repo::goals::{self, GoalFilter};
use crate::repo::notifications::{self, NotificationFilter};
use crate::repo::transactions::{self, TransactionFilter};
use crate::repo::users;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        resolve(ctx, users::me)
    }

    /// Only the caller's own record is ever returned.
    async fn user(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<User>> {
        resolve_opt(ctx, |repo| repo.get::<User>(id))
    }

    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        resolve(ctx, users::list)
    }

    async fn account(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Account>> {
        resolve_opt(ctx, |repo| repo.get::<Account>(id))
    }

    async fn accounts(&self, ctx: &Context<'_>, is_active: Option<bool>) -> Result<Vec<Account>> {
        let filter = AccountFilter {
            is_active,
            ..Default::default()
        };
        resolve(ctx, |repo| accounts::list(repo, &filter))
    }

    async fn category(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Category>> {
        resolve_opt(ctx, |repo| categories::get(repo, id))
    }

    async fn categories(
        &self,
        ctx: &Context<'_>,
        category_type: Option<CategoryType>,
    ) -> Result<Vec<Category>> {
        let filter = CategoryFilter {
            category_type,
            ..Default::default()
        };
        resolve(ctx, |repo| categories::list(repo, &filter))
    }

    async fn transaction(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Transaction>> {
        resolve_opt(ctx, |repo| repo.get::<Transaction>(id))
    }

    async fn transactions(
        &self,
        ctx: &Context<'_>,
        transaction_type: Option<TransactionType>,
        account_id: Option<Uuid>,
        category_id: Option<Uuid>,
    ) -> Result<Vec<Transaction>> {
        let filter = TransactionFilter {
            transaction_type,
            account: account_id,
            category: category_id,
            ..Default::default()
        };
        resolve(ctx, |repo| transactions::list(repo, &filter))
    }

    async fn budget(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Budget>> {
        resolve_opt(ctx, |repo| budgets::get(repo, id))
    }

    async fn budgets(&self, ctx: &Context<'_>, is_active: Option<bool>) -> Result<Vec<Budget>> {
        let filter = BudgetFilter {
            is_active,
            ..Default::default()
        };
        resolve(ctx, |repo| budgets::list(repo, &filter))
    }

    async fn budget_category(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<BudgetCategory>> {
        resolve_opt(ctx, |repo| repo.get::<BudgetCategory>(id))
    }

    async fn budget_summary(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<BudgetSummary>> {
        resolve_opt(ctx, |repo| reports::budget_summary(repo, id))
    }

    async fn goal(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Goal>> {
        resolve_opt(ctx, |repo| repo.get::<Goal>(id))
    }

    async fn goals(&self, ctx: &Context<'_>, is_achieved: Option<bool>) -> Result<Vec<Goal>> {
        let filter = GoalFilter {
            is_achieved,
            ..Default::default()
        };
        resolve(ctx, |repo| goals::list(repo, &filter))
    }

    async fn notification(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Notification>> {
        resolve_opt(ctx, |repo| repo.get::<Notification>(id))
    }

    async fn notifications(
        &self,
        ctx: &Context<'_>,
        is_read: Option<bool>,
    ) -> Result<Vec<Notification>> {
        let filter = NotificationFilter {
            is_read,
            ordering: None,
        };
        resolve(ctx, |repo| notifications::list(repo, &filter))
    }

    async fn spending_trends(&self, ctx: &Context<'_>, days: Option<i64>) -> Result<Vec<DailyTotal>> {
        let today = Utc::now().date_naive();
        resolve(ctx, |repo| reports::spending_trends(repo, today, days))
    }

    async fn category_breakdown(
        &self,
        ctx: &Context<'_>,
        days: Option<i64>,
    ) -> Result<Vec<CategoryTotal>> {
        let today = Utc::now().date_naive();
        resolve(ctx, |repo| reports::category_breakdown(repo, today, days))
    }

    async fn income_vs_expenses(
        &self,
        ctx: &Context<'_>,
        days: Option<i64>,
    ) -> Result<IncomeVsExpenses> {
        let today = Utc::now().date_naive();
        resolve(ctx, |repo| reports::income_vs_expenses(repo, today, days))
    }

    async fn net_worth(&self, ctx: &Context<'_>) -> Result<NetWorth> {
        resolve(ctx, reports::net_worth)
    }

    async fn monthly_summary(
        &self,
        ctx: &Context<'_>,
        months: Option<i64>,
    ) -> Result<Vec<MonthlySummary>> {
        let today = Utc::now().date_naive();
        resolve(ctx, |repo| reports::monthly_summary(repo, today, months))
    }
}

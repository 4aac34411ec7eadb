// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Every mutation answers with a `{success, errors, <entity>}` payload. Domain
//! failures land in `errors`; only internal faults become GraphQL errors.

use async_graphql::{Context, Object, Result, SimpleObject};
use uuid::Uuid;

use super::{attempt, to_gql};
use crate::error::AppResult;
use crate::models::{
    Account, AccountPatch, Budget, BudgetCategory, BudgetCategoryPatch, BudgetPatch, Category,
    CategoryPatch, Goal, GoalPatch, NewAccount, NewBudget, NewBudgetCategory, NewCategory,
    NewGoal, NewNotification, NewTransaction, Notification, NotificationPatch, Transaction,
    TransactionPatch, User, UserPatch,
};
use crate::repo::{accounts, budgets, categories, goals, notifications, transactions, users};

macro_rules! payload {
    ($name:ident, $field:ident, $ty:ty) => {
        #[derive(Debug, SimpleObject)]
        pub struct $name {
            pub success: bool,
            pub errors: Vec<String>,
            pub $field: Option<$ty>,
        }

        impl $name {
            fn from_result(result: AppResult<$ty>) -> Result<Self> {
                match result {
                    Ok(v) => Ok(Self {
                        success: true,
                        errors: Vec::new(),
                        $field: Some(v),
                    }),
                    Err(e) if e.is_internal() => Err(to_gql(e)),
                    Err(e) => Ok(Self {
                        success: false,
                        errors: e.messages(),
                        $field: None,
                    }),
                }
            }
        }
    };
}

payload!(UserPayload, user, User);
payload!(AccountPayload, account, Account);
payload!(CategoryPayload, category, Category);
payload!(TransactionPayload, transaction, Transaction);
payload!(BudgetPayload, budget, Budget);
payload!(BudgetCategoryPayload, budget_category, BudgetCategory);
payload!(GoalPayload, goal, Goal);
payload!(NotificationPayload, notification, Notification);
payload!(DeletePayload, deleted_id, Uuid);
payload!(MarkAllReadPayload, count, i64);

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn update_me(&self, ctx: &Context<'_>, input: UserPatch) -> Result<UserPayload> {
        UserPayload::from_result(attempt(ctx, |repo| users::update_me(repo, &input))?)
    }

    async fn create_account(&self, ctx: &Context<'_>, input: NewAccount) -> Result<AccountPayload> {
        AccountPayload::from_result(attempt(ctx, |repo| accounts::create(repo, &input))?)
    }

    async fn update_account(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: AccountPatch,
    ) -> Result<AccountPayload> {
        AccountPayload::from_result(attempt(ctx, |repo| accounts::update(repo, id, &input))?)
    }

    async fn delete_account(&self, ctx: &Context<'_>, id: Uuid) -> Result<DeletePayload> {
        DeletePayload::from_result(attempt(ctx, |repo| {
            repo.delete::<Account>(id).map(|_| id)
        })?)
    }

    async fn create_category(
        &self,
        ctx: &Context<'_>,
        input: NewCategory,
    ) -> Result<CategoryPayload> {
        CategoryPayload::from_result(attempt(ctx, |repo| categories::create(repo, &input))?)
    }

    async fn update_category(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: CategoryPatch,
    ) -> Result<CategoryPayload> {
        CategoryPayload::from_result(attempt(ctx, |repo| categories::update(repo, id, &input))?)
    }

    /// Deactivates the category; it stays reachable by id.
    async fn delete_category(&self, ctx: &Context<'_>, id: Uuid) -> Result<DeletePayload> {
        DeletePayload::from_result(attempt(ctx, |repo| {
            repo.delete::<Category>(id).map(|_| id)
        })?)
    }

    async fn create_transaction(
        &self,
        ctx: &Context<'_>,
        input: NewTransaction,
    ) -> Result<TransactionPayload> {
        TransactionPayload::from_result(attempt(ctx, |repo| transactions::create(repo, &input))?)
    }

    async fn update_transaction(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: TransactionPatch,
    ) -> Result<TransactionPayload> {
        TransactionPayload::from_result(attempt(ctx, |repo| {
            transactions::update(repo, id, &input)
        })?)
    }

    async fn delete_transaction(&self, ctx: &Context<'_>, id: Uuid) -> Result<DeletePayload> {
        DeletePayload::from_result(attempt(ctx, |repo| {
            repo.delete::<Transaction>(id).map(|_| id)
        })?)
    }

    async fn create_budget(&self, ctx: &Context<'_>, input: NewBudget) -> Result<BudgetPayload> {
        BudgetPayload::from_result(attempt(ctx, |repo| budgets::create(repo, &input))?)
    }

    async fn update_budget(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: BudgetPatch,
    ) -> Result<BudgetPayload> {
        BudgetPayload::from_result(attempt(ctx, |repo| budgets::update(repo, id, &input))?)
    }

    async fn delete_budget(&self, ctx: &Context<'_>, id: Uuid) -> Result<DeletePayload> {
        DeletePayload::from_result(attempt(ctx, |repo| {
            repo.delete::<Budget>(id).map(|_| id)
        })?)
    }

    async fn create_budget_category(
        &self,
        ctx: &Context<'_>,
        input: NewBudgetCategory,
    ) -> Result<BudgetCategoryPayload> {
        BudgetCategoryPayload::from_result(attempt(ctx, |repo| {
            budgets::create_allocation(repo, &input)
        })?)
    }

    async fn update_budget_category(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: BudgetCategoryPatch,
    ) -> Result<BudgetCategoryPayload> {
        BudgetCategoryPayload::from_result(attempt(ctx, |repo| {
            budgets::update_allocation(repo, id, &input)
        })?)
    }

    async fn delete_budget_category(&self, ctx: &Context<'_>, id: Uuid) -> Result<DeletePayload> {
        DeletePayload::from_result(attempt(ctx, |repo| {
            repo.delete::<BudgetCategory>(id).map(|_| id)
        })?)
    }

    async fn create_goal(&self, ctx: &Context<'_>, input: NewGoal) -> Result<GoalPayload> {
        GoalPayload::from_result(attempt(ctx, |repo| goals::create(repo, &input))?)
    }

    async fn update_goal(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: GoalPatch,
    ) -> Result<GoalPayload> {
        GoalPayload::from_result(attempt(ctx, |repo| goals::update(repo, id, &input))?)
    }

    async fn delete_goal(&self, ctx: &Context<'_>, id: Uuid) -> Result<DeletePayload> {
        DeletePayload::from_result(attempt(ctx, |repo| repo.delete::<Goal>(id).map(|_| id))?)
    }

    async fn create_notification(
        &self,
        ctx: &Context<'_>,
        input: NewNotification,
    ) -> Result<NotificationPayload> {
        NotificationPayload::from_result(attempt(ctx, |repo| {
            notifications::create(repo, &input)
        })?)
    }

    async fn update_notification(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: NotificationPatch,
    ) -> Result<NotificationPayload> {
        NotificationPayload::from_result(attempt(ctx, |repo| {
            notifications::update(repo, id, &input)
        })?)
    }

    async fn delete_notification(&self, ctx: &Context<'_>, id: Uuid) -> Result<DeletePayload> {
        DeletePayload::from_result(attempt(ctx, |repo| {
            repo.delete::<Notification>(id).map(|_| id)
        })?)
    }

    async fn mark_notification_read(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> Result<NotificationPayload> {
        NotificationPayload::from_result(attempt(ctx, |repo| notifications::mark_read(repo, id))?)
    }

    async fn mark_all_notifications_read(&self, ctx: &Context<'_>) -> Result<MarkAllReadPayload> {
        MarkAllReadPayload::from_result(attempt(ctx, |repo| {
            notifications::mark_all_read(repo).map(|n| n as i64)
        })?)
    }
}

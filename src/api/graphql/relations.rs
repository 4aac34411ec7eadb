// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Related objects reachable from a row. They load through the same read
//! gate as a direct query, so a hidden relation is `null`.

use async_graphql::{ComplexObject, Context, Result};

use super::resolve_opt;
use crate::models::{Account, BudgetCategory, Category, Transaction};
use crate::repo::categories;

#[ComplexObject]
impl Transaction {
    async fn account(&self, ctx: &Context<'_>) -> Result<Option<Account>> {
        resolve_opt(ctx, |repo| repo.get::<Account>(self.account_id))
    }

    async fn category(&self, ctx: &Context<'_>) -> Result<Option<Category>> {
        let Some(id) = self.category_id else {
            return Ok(None);
        };
        resolve_opt(ctx, |repo| categories::get(repo, id))
    }
}

#[ComplexObject]
impl BudgetCategory {
    async fn category(&self, ctx: &Context<'_>) -> Result<Option<Category>> {
        resolve_opt(ctx, |repo| categories::get(repo, self.category_id))
    }
}

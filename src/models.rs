// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Canonical record and input shapes. The same structs are serialized by the
//! REST handlers and exposed as GraphQL objects and inputs.

use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, async_graphql::Enum)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

text_enum!(AccountType {
    Bank => "bank",
    MobileMoney => "mobile_money",
    Cash => "cash",
});

text_enum!(CategoryType {
    Income => "income",
    Expense => "expense",
});

text_enum!(TransactionType {
    Income => "income",
    Expense => "expense",
});

text_enum!(PaymentMethod {
    Cash => "cash",
    MobileMoney => "mobile_money",
    BankTransfer => "bank_transfer",
    Card => "card",
});

text_enum!(
    /// `debt` is a debt payoff goal, `purchase` a planned purchase.
    GoalType {
        Savings => "savings",
        Debt => "debt",
        Purchase => "purchase",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub preferred_currency: String,
    pub country: String,
    pub timezone: String,
    pub language: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Account {
    pub id: Uuid,
    #[serde(skip)]
    #[graphql(skip)]
    pub user_id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    pub currency: String,
    pub balance: Decimal,
    pub institution: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Category {
    pub id: Uuid,
    /// `None` for system categories.
    #[serde(skip)]
    #[graphql(skip)]
    pub user_id: Option<Uuid>,
    pub name: String,
    pub category_type: CategoryType,
    pub parent_id: Option<Uuid>,
    pub is_system: bool,
    pub is_active: bool,
    pub children: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(skip)]
    #[graphql(skip)]
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub description: String,
    pub notes: String,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST rendering of a transaction with its related rows inlined.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub account_detail: Option<Account>,
    pub category_detail: Option<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Budget {
    pub id: Uuid,
    #[serde(skip)]
    #[graphql(skip)]
    pub user_id: Uuid,
    pub name: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub categories: Vec<BudgetCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct BudgetCategory {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub category_id: Uuid,
    /// Owner of the parent budget.
    #[serde(skip)]
    #[graphql(skip)]
    pub owner_id: Uuid,
    pub allocated_amount: Decimal,
    /// Fraction of the allocation (0..=1) at which an alert is due.
    pub alert_threshold: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Goal {
    pub id: Uuid,
    #[serde(skip)]
    #[graphql(skip)]
    pub user_id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub currency: String,
    pub deadline: Option<NaiveDate>,
    pub goal_type: GoalType,
    pub is_achieved: bool,
    pub progress_percentage: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Notification {
    pub id: Uuid,
    #[serde(skip)]
    #[graphql(skip)]
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Inputs. Owner fields are deliberately absent: the caller is always the owner.

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub preferred_currency: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
pub struct NewAccount {
    pub name: String,
    pub account_type: AccountType,
    pub currency: Option<String>,
    /// Opening balance.
    pub balance: Option<Decimal>,
    pub institution: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub currency: Option<String>,
    pub balance: Option<Decimal>,
    pub institution: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
pub struct NewCategory {
    pub name: String,
    pub category_type: CategoryType,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub category_type: Option<CategoryType>,
    pub parent_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    /// Defaults to the account currency.
    pub currency: Option<String>,
    pub transaction_type: TransactionType,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
pub struct TransactionPatch {
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
pub struct NewBudget {
    pub name: String,
    pub total_amount: Decimal,
    pub currency: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
pub struct BudgetPatch {
    pub name: Option<String>,
    pub total_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
pub struct NewBudgetCategory {
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub allocated_amount: Decimal,
    pub alert_threshold: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
pub struct BudgetCategoryPatch {
    pub category_id: Option<Uuid>,
    pub allocated_amount: Option<Decimal>,
    pub alert_threshold: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub goal_type: GoalType,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub goal_type: Option<GoalType>,
    pub deadline: Option<NaiveDate>,
    pub is_achieved: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
pub struct NotificationPatch {
    pub title: Option<String>,
    pub message: Option<String>,
    pub is_read: Option<bool>,
}

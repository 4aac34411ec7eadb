// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{NaiveDate, Utc};
use personifi::api::{AppState, build_router};
use personifi::auth::{Caller, issue_token};
use personifi::config::Settings;
use personifi::db::{self, Db};
use personifi::models::{
    Account, AccountType, Category, CategoryType, NewAccount, NewCategory, NewTransaction,
    NewUser, PaymentMethod, Transaction, TransactionType,
};
use personifi::repo::{Repo, accounts, categories, transactions, users};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

pub fn new_db() -> Db {
    Db::new(db::open_in_memory().unwrap())
}

pub fn add_user(db: &Db, email: &str) -> Caller {
    let input = NewUser {
        email: email.to_string(),
        first_name: Some("Ada".to_string()),
        last_name: None,
        preferred_currency: None,
    };
    let user = db
        .with(|conn| users::create(conn, &input, Utc::now()))
        .unwrap();
    Caller { user_id: user.id }
}

pub fn token_for(db: &Db, caller: Caller) -> String {
    db.with(|conn| issue_token(conn, caller.user_id, "test", None, Utc::now()))
        .unwrap()
        .token
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn account(db: &Db, caller: Caller, name: &str, currency: &str, balance: &str) -> Account {
    let input = NewAccount {
        name: name.to_string(),
        account_type: AccountType::Bank,
        currency: Some(currency.to_string()),
        balance: Some(dec(balance)),
        institution: None,
    };
    db.with(|conn| accounts::create(&Repo::new(conn, caller), &input))
        .unwrap()
}

pub fn category(db: &Db, caller: Caller, name: &str, kind: CategoryType) -> Category {
    let input = NewCategory {
        name: name.to_string(),
        category_type: kind,
        parent_id: None,
    };
    db.with(|conn| categories::create(&Repo::new(conn, caller), &input))
        .unwrap()
}

pub fn tx(
    db: &Db,
    caller: Caller,
    account: &Account,
    category: Option<&Category>,
    kind: TransactionType,
    amount: &str,
    on: &str,
) -> Transaction {
    let input = NewTransaction {
        account_id: account.id,
        category_id: category.map(|c| c.id),
        amount: dec(amount),
        currency: None,
        transaction_type: kind,
        date: Some(date(on)),
        description: Some(format!("{} {}", kind, amount)),
        notes: None,
        payment_method: PaymentMethod::Card,
    };
    db.with(|conn| transactions::create(&Repo::new(conn, caller), &input))
        .unwrap()
}

pub fn app(db: &Db) -> Router {
    build_router(AppState::new(db.clone(), Settings::default()))
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::*;
use personifi::error::AppError;
use personifi::models::{
    AccountType, CategoryPatch, CategoryType, GoalPatch, GoalType, NewAccount, NewCategory,
    NewGoal, NewNotification,
};
use personifi::repo::{Repo, accounts, categories, goals, notifications};

fn rejects_field<T: std::fmt::Debug>(r: Result<T, AppError>, field: &str) {
    match r {
        Err(AppError::Validation(errors)) => {
            assert!(
                errors.iter().any(|e| e.field == field),
                "no error on {}: {:?}",
                field,
                errors
            );
        }
        other => panic!("expected a validation error on {}, got {:?}", field, other),
    }
}

#[test]
fn goal_names_allow_120_characters() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let goal = |name: String| NewGoal {
        name,
        target_amount: dec("100.00"),
        current_amount: None,
        currency: None,
        goal_type: GoalType::Savings,
        deadline: None,
    };

    let created = db
        .with(|conn| goals::create(&Repo::new(conn, alice), &goal("g".repeat(120))))
        .unwrap();
    assert_eq!(created.name.chars().count(), 120);
    rejects_field(
        db.with(|conn| goals::create(&Repo::new(conn, alice), &goal("g".repeat(121)))),
        "name",
    );

    let patch = GoalPatch {
        name: Some("g".repeat(121)),
        ..Default::default()
    };
    rejects_field(
        db.with(|conn| goals::update(&Repo::new(conn, alice), created.id, &patch)),
        "name",
    );
}

#[test]
fn category_names_allow_60_characters() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let category = |name: String| NewCategory {
        name,
        category_type: CategoryType::Expense,
        parent_id: None,
    };

    let created = db
        .with(|conn| categories::create(&Repo::new(conn, alice), &category("c".repeat(60))))
        .unwrap();
    rejects_field(
        db.with(|conn| categories::create(&Repo::new(conn, alice), &category("c".repeat(61)))),
        "name",
    );

    let patch = CategoryPatch {
        name: Some("c".repeat(61)),
        ..Default::default()
    };
    rejects_field(
        db.with(|conn| categories::update(&Repo::new(conn, alice), created.id, &patch)),
        "name",
    );
}

#[test]
fn account_institution_allows_120_characters() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let acct = |institution: String| NewAccount {
        name: "Main".to_string(),
        account_type: AccountType::Bank,
        currency: None,
        balance: None,
        institution: Some(institution),
    };

    let created = db
        .with(|conn| accounts::create(&Repo::new(conn, alice), &acct("i".repeat(120))))
        .unwrap();
    assert_eq!(created.institution.chars().count(), 120);
    rejects_field(
        db.with(|conn| accounts::create(&Repo::new(conn, alice), &acct("i".repeat(121)))),
        "institution",
    );
}

#[test]
fn notification_titles_allow_120_characters() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let note = |title: String| NewNotification {
        title,
        message: "Body".to_string(),
    };

    db.with(|conn| notifications::create(&Repo::new(conn, alice), &note("t".repeat(120))))
        .unwrap();
    rejects_field(
        db.with(|conn| notifications::create(&Repo::new(conn, alice), &note("t".repeat(121)))),
        "title",
    );
}

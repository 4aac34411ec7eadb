// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::Utc;
use common::*;
use personifi::error::AppError;
use personifi::models::{
    Account, AccountPatch, Budget, BudgetCategory, Category, CategoryPatch, CategoryType, Goal,
    GoalType, NewBudget, NewBudgetCategory, NewCategory, NewGoal, NewNotification,
    NewTransaction, Notification, PaymentMethod, Transaction, TransactionType,
};
use personifi::repo::categories::{self, CategoryFilter};
use personifi::repo::{Repo, accounts, budgets, goals, notifications, transactions};

fn assert_not_found<T: std::fmt::Debug>(r: Result<T, AppError>) {
    match r {
        Err(AppError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn foreign_rows_are_invisible_on_every_verb() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let bob = add_user(&db, "bob@example.com");

    let acct = account(&db, alice, "Main", "NGN", "100.00");
    let food = category(&db, alice, "Food", CategoryType::Expense);
    let t = tx(&db, alice, &acct, Some(&food), TransactionType::Expense, "10.00", "2025-03-01");
    let (budget, alloc, goal, note) = db
        .with(|conn| {
            let repo = Repo::new(conn, alice);
            let b = budgets::create(
                &repo,
                &NewBudget {
                    name: "March".into(),
                    total_amount: dec("500.00"),
                    currency: None,
                    start_date: date("2025-03-01"),
                    end_date: date("2025-03-31"),
                },
            )?;
            let bc = budgets::create_allocation(
                &repo,
                &NewBudgetCategory {
                    budget_id: b.id,
                    category_id: food.id,
                    allocated_amount: dec("200.00"),
                    alert_threshold: None,
                },
            )?;
            let g = goals::create(
                &repo,
                &NewGoal {
                    name: "Laptop".into(),
                    target_amount: dec("1000.00"),
                    current_amount: None,
                    currency: None,
                    goal_type: GoalType::Purchase,
                    deadline: None,
                },
            )?;
            let n = notifications::create(
                &repo,
                &NewNotification {
                    title: "Hi".into(),
                    message: "Welcome".into(),
                },
            )?;
            Ok((b, bc, g, n))
        })
        .unwrap();

    db.with(|conn| {
        let repo = Repo::new(conn, bob);
        assert_not_found(repo.get::<Account>(acct.id));
        assert_not_found(repo.get::<Category>(food.id));
        assert_not_found(repo.get::<Transaction>(t.id));
        assert_not_found(repo.get::<Budget>(budget.id));
        assert_not_found(repo.get::<BudgetCategory>(alloc.id));
        assert_not_found(repo.get::<Goal>(goal.id));
        assert_not_found(repo.get::<Notification>(note.id));

        assert_not_found(accounts::update(
            &repo,
            acct.id,
            &AccountPatch {
                name: Some("Mine now".into()),
                ..Default::default()
            },
        ));
        assert_not_found(notifications::mark_read(&repo, note.id));

        assert_not_found(repo.delete::<Account>(acct.id));
        assert_not_found(repo.delete::<Category>(food.id));
        assert_not_found(repo.delete::<Transaction>(t.id));
        assert_not_found(repo.delete::<Budget>(budget.id));
        assert_not_found(repo.delete::<BudgetCategory>(alloc.id));
        assert_not_found(repo.delete::<Goal>(goal.id));
        assert_not_found(repo.delete::<Notification>(note.id));
        Ok(())
    })
    .unwrap();

    // Nothing bob attempted touched alice's rows.
    let still = db
        .with(|conn| Repo::new(conn, alice).get::<Account>(acct.id))
        .unwrap();
    assert_eq!(still.name, "Main");
}

#[test]
fn create_stamps_the_caller_as_owner() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let bob = add_user(&db, "bob@example.com");

    let acct = account(&db, alice, "Wallet", "ngn", "0");
    assert_eq!(acct.user_id, alice.user_id);
    assert_eq!(acct.currency, "NGN");

    let listed = db
        .with(|conn| accounts::list(&Repo::new(conn, bob), &Default::default()))
        .unwrap();
    assert!(listed.is_empty());
}

#[test]
fn transaction_requires_an_owned_account() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let bob = add_user(&db, "bob@example.com");
    let acct = account(&db, alice, "Main", "USD", "0");

    let err = db
        .with(|conn| {
            transactions::create(
                &Repo::new(conn, bob),
                &NewTransaction {
                    account_id: acct.id,
                    category_id: None,
                    amount: dec("5.00"),
                    currency: None,
                    transaction_type: TransactionType::Expense,
                    date: None,
                    description: None,
                    notes: None,
                    payment_method: PaymentMethod::Cash,
                },
            )
        })
        .unwrap_err();
    match err {
        AppError::Validation(fields) => {
            assert!(fields.iter().any(|f| f.field == "account_id"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn transaction_inherits_account_currency() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let acct = account(&db, alice, "Dollar", "USD", "0");
    let t = tx(&db, alice, &acct, None, TransactionType::Income, "42.5", "2025-01-02");
    assert_eq!(t.currency, "USD");
    assert_eq!(t.amount, dec("42.50"));
}

#[test]
fn system_categories_are_shared_but_immutable() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    db.with(|conn| categories::seed_system(conn, Utc::now()))
        .unwrap();

    db.with(|conn| {
        let repo = Repo::new(conn, alice);
        let all = categories::list(&repo, &CategoryFilter::default())?;
        let salary = all
            .iter()
            .find(|c| c.name == "Salary")
            .expect("seeded category visible");
        assert!(salary.is_system);

        match repo.delete::<Category>(salary.id) {
            Err(AppError::PermissionDenied(_)) => {}
            other => panic!("expected PermissionDenied, got {:?}", other),
        }
        match categories::update(
            &repo,
            salary.id,
            &CategoryPatch {
                name: Some("Wages".into()),
                ..Default::default()
            },
        ) {
            Err(AppError::PermissionDenied(_)) => {}
            other => panic!("expected PermissionDenied, got {:?}", other),
        }
        Ok(())
    })
    .unwrap();
}

#[test]
fn deleting_own_category_deactivates_it() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let side = category(&db, alice, "Side gigs", CategoryType::Income);

    db.with(|conn| {
        let repo = Repo::new(conn, alice);
        repo.delete::<Category>(side.id)?;

        let fetched = categories::get(&repo, side.id)?;
        assert!(!fetched.is_active);

        let listed = categories::list(&repo, &CategoryFilter::default())?;
        assert!(listed.iter().all(|c| c.id != side.id));
        Ok(())
    })
    .unwrap();
}

#[test]
fn children_nest_under_visible_parents() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let bob = add_user(&db, "bob@example.com");
    let home = category(&db, alice, "Home", CategoryType::Expense);

    let child = db
        .with(|conn| {
            categories::create(
                &Repo::new(conn, alice),
                &NewCategory {
                    name: "Repairs".into(),
                    category_type: CategoryType::Expense,
                    parent_id: Some(home.id),
                },
            )
        })
        .unwrap();

    let parent = db
        .with(|conn| categories::get(&Repo::new(conn, alice), home.id))
        .unwrap();
    assert_eq!(parent.children.len(), 1);
    assert_eq!(parent.children[0].id, child.id);

    // A parent must be visible to the caller.
    let err = db
        .with(|conn| {
            categories::create(
                &Repo::new(conn, bob),
                &NewCategory {
                    name: "Sneaky".into(),
                    category_type: CategoryType::Expense,
                    parent_id: Some(home.id),
                },
            )
        })
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Cycles are refused.
    let err = db
        .with(|conn| {
            categories::update(
                &Repo::new(conn, alice),
                home.id,
                &CategoryPatch {
                    parent_id: Some(child.id),
                    ..Default::default()
                },
            )
        })
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn mark_all_read_only_touches_the_caller() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let bob = add_user(&db, "bob@example.com");
    for (who, title) in [(alice, "a1"), (alice, "a2"), (bob, "b1")] {
        db.with(|conn| {
            notifications::create(
                &Repo::new(conn, who),
                &NewNotification {
                    title: title.into(),
                    message: "m".into(),
                },
            )
        })
        .unwrap();
    }

    let changed = db
        .with(|conn| notifications::mark_all_read(&Repo::new(conn, alice)))
        .unwrap();
    assert_eq!(changed, 2);

    let bob_unread = db
        .with(|conn| notifications::unread(&Repo::new(conn, bob)))
        .unwrap();
    assert_eq!(bob_unread.len(), 1);
}

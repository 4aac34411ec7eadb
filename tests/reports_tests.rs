// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::*;
use personifi::auth::Caller;
use personifi::db::Db;
use personifi::error::AppError;
use personifi::models::{AccountPatch, CategoryType, NewBudget, NewBudgetCategory, TransactionType};
use personifi::reports;
use personifi::repo::transactions::{self, TransactionFilter};
use personifi::repo::{Repo, accounts, budgets};

struct Fixture {
    db: Db,
    alice: Caller,
    main: personifi::models::Account,
    dollar: personifi::models::Account,
    food: personifi::models::Category,
}

/// Two accounts, five transactions: three on `main`, two on `dollar`.
fn fixture() -> Fixture {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let main = account(&db, alice, "Main", "NGN", "1000.00");
    let dollar = account(&db, alice, "Dollar", "USD", "50.00");
    let food = category(&db, alice, "Food", CategoryType::Expense);
    let salary = category(&db, alice, "Pay", CategoryType::Income);

    tx(&db, alice, &main, Some(&salary), TransactionType::Income, "5000.00", "2025-06-20");
    tx(&db, alice, &main, Some(&food), TransactionType::Expense, "200.00", "2025-06-21");
    tx(&db, alice, &main, None, TransactionType::Expense, "300.00", "2025-06-21");
    tx(&db, alice, &dollar, Some(&food), TransactionType::Expense, "50.00", "2025-06-25");
    tx(&db, alice, &dollar, None, TransactionType::Income, "100.00", "2025-04-01");

    Fixture {
        db,
        alice,
        main,
        dollar,
        food,
    }
}

fn today() -> chrono::NaiveDate {
    date("2025-06-30")
}

#[test]
fn account_filter_splits_transactions() {
    let f = fixture();
    f.db.with(|conn| {
        let repo = Repo::new(conn, f.alice);
        let on_main = transactions::list(
            &repo,
            &TransactionFilter {
                account: Some(f.main.id),
                ..Default::default()
            },
        )?;
        let on_dollar = transactions::list(
            &repo,
            &TransactionFilter {
                account: Some(f.dollar.id),
                ..Default::default()
            },
        )?;
        assert_eq!(on_main.len(), 3);
        assert_eq!(on_dollar.len(), 2);

        let summary = reports::transaction_summary(&on_main);
        assert_eq!(summary.total_income, dec("5000.00"));
        assert_eq!(summary.total_expenses, dec("500.00"));
        assert_eq!(summary.net, dec("4500.00"));
        Ok(())
    })
    .unwrap();
}

#[test]
fn newest_transactions_come_first_by_default() {
    let f = fixture();
    let rows = f
        .db
        .with(|conn| transactions::list(&Repo::new(conn, f.alice), &TransactionFilter::default()))
        .unwrap();
    let dates: Vec<_> = rows.iter().map(|t| t.date.to_string()).collect();
    assert_eq!(dates[0], "2025-06-25");
    assert_eq!(dates[dates.len() - 1], "2025-04-01");
}

#[test]
fn amount_filter_compares_numerically() {
    let f = fixture();
    let rows = f
        .db
        .with(|conn| {
            transactions::list(
                &Repo::new(conn, f.alice),
                &TransactionFilter {
                    amount_min: Some(dec("100")),
                    amount_max: Some(dec("300")),
                    ..Default::default()
                },
            )
        })
        .unwrap();
    let mut amounts: Vec<_> = rows.iter().map(|t| t.amount).collect();
    amounts.sort();
    assert_eq!(amounts, vec![dec("100.00"), dec("200.00"), dec("300.00")]);
}

#[test]
fn spending_trends_group_expenses_by_day() {
    let f = fixture();
    let trends = f
        .db
        .with(|conn| reports::spending_trends(&Repo::new(conn, f.alice), today(), Some(30)))
        .unwrap();
    assert_eq!(trends.len(), 2);
    assert_eq!(trends[0].day, date("2025-06-21"));
    assert_eq!(trends[0].total, dec("500.00"));
    assert_eq!(trends[0].count, 2);
    assert_eq!(trends[1].day, date("2025-06-25"));
    assert_eq!(trends[1].total, dec("50.00"));
}

#[test]
fn category_breakdown_labels_missing_categories() {
    let f = fixture();
    let rows = f
        .db
        .with(|conn| reports::category_breakdown(&Repo::new(conn, f.alice), today(), None))
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].category, "Uncategorized");
    assert_eq!(rows[0].total, dec("300.00"));
    assert_eq!(rows[1].category, "Food");
    assert_eq!(rows[1].total, dec("250.00"));
    assert_eq!(rows[1].count, 2);
}

#[test]
fn income_vs_expenses_reports_savings_rate() {
    let f = fixture();
    let ie = f
        .db
        .with(|conn| reports::income_vs_expenses(&Repo::new(conn, f.alice), today(), Some(30)))
        .unwrap();
    assert_eq!(ie.income, dec("5000.00"));
    assert_eq!(ie.expenses, dec("550.00"));
    assert_eq!(ie.net, dec("4450.00"));
    assert_eq!(ie.savings_rate, dec("89.00"));
}

#[test]
fn savings_rate_is_zero_without_income() {
    let db = new_db();
    let bob = add_user(&db, "bob@example.com");
    let wallet = account(&db, bob, "Wallet", "NGN", "0");
    tx(&db, bob, &wallet, None, TransactionType::Expense, "75.00", "2025-06-29");

    let ie = db
        .with(|conn| reports::income_vs_expenses(&Repo::new(conn, bob), today(), None))
        .unwrap();
    assert_eq!(ie.income, dec("0"));
    assert_eq!(ie.net, dec("-75.00"));
    assert_eq!(ie.savings_rate, dec("0"));
}

#[test]
fn windows_outside_bounds_are_rejected() {
    let f = fixture();
    f.db.with(|conn| {
        let repo = Repo::new(conn, f.alice);
        assert!(matches!(
            reports::spending_trends(&repo, today(), Some(0)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            reports::monthly_summary(&repo, today(), Some(121)),
            Err(AppError::Validation(_))
        ));
        Ok(())
    })
    .unwrap();
}

#[test]
fn monthly_summary_buckets_by_calendar_month() {
    let f = fixture();
    let months = f
        .db
        .with(|conn| reports::monthly_summary(&Repo::new(conn, f.alice), today(), Some(6)))
        .unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].month, "2025-04");
    assert_eq!(months[0].income, dec("100.00"));
    assert_eq!(months[0].expenses, dec("0"));
    assert_eq!(months[1].month, "2025-06");
    assert_eq!(months[1].net, dec("4450.00"));
}

#[test]
fn net_worth_sums_active_accounts_per_currency() {
    let f = fixture();
    let closed = account(&f.db, f.alice, "Closed", "NGN", "999.00");
    f.db.with(|conn| {
        accounts::update(
            &Repo::new(conn, f.alice),
            closed.id,
            &AccountPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
    })
    .unwrap();

    let nw = f
        .db
        .with(|conn| reports::net_worth(&Repo::new(conn, f.alice)))
        .unwrap();
    assert_eq!(nw.accounts_count, 2);
    assert_eq!(nw.by_currency.len(), 2);
    assert_eq!(nw.by_currency[0].currency, "NGN");
    assert_eq!(nw.by_currency[0].total, dec("1000.00"));
    assert_eq!(nw.by_currency[1].currency, "USD");
    assert_eq!(nw.by_currency[1].total, dec("50.00"));
}

#[test]
fn budget_summary_flags_overspent_allocations() {
    let f = fixture();
    let summary = f
        .db
        .with(|conn| {
            let repo = Repo::new(conn, f.alice);
            let b = budgets::create(
                &repo,
                &NewBudget {
                    name: "June".into(),
                    total_amount: dec("1000.00"),
                    currency: None,
                    start_date: date("2025-06-01"),
                    end_date: date("2025-06-30"),
                },
            )?;
            budgets::create_allocation(
                &repo,
                &NewBudgetCategory {
                    budget_id: b.id,
                    category_id: f.food.id,
                    allocated_amount: dec("200.00"),
                    alert_threshold: None,
                },
            )?;
            reports::budget_summary(&repo, b.id)
        })
        .unwrap();

    assert_eq!(summary.spent, dec("550.00"));
    assert_eq!(summary.remaining, dec("450.00"));
    assert_eq!(summary.percentage_used, dec("55.00"));
    assert_eq!(summary.categories.len(), 1);
    let food = &summary.categories[0];
    assert_eq!(food.category, "Food");
    assert_eq!(food.spent, dec("250.00"));
    assert_eq!(food.remaining, dec("-50.00"));
    assert_eq!(food.percentage_used, dec("125.00"));
    assert_eq!(food.alert_threshold, dec("0.80"));
    assert!(food.alert_triggered);
}

#[test]
fn zero_total_budget_reports_zero_percent() {
    let f = fixture();
    let summary = f
        .db
        .with(|conn| {
            let repo = Repo::new(conn, f.alice);
            let b = budgets::create(
                &repo,
                &NewBudget {
                    name: "Empty".into(),
                    total_amount: dec("0"),
                    currency: Some("ngn".into()),
                    start_date: date("2025-06-01"),
                    end_date: date("2025-06-30"),
                },
            )?;
            reports::budget_summary(&repo, b.id)
        })
        .unwrap();
    assert_eq!(summary.currency, "NGN");
    assert_eq!(summary.spent, dec("550.00"));
    assert_eq!(summary.percentage_used, dec("0"));
}

#[test]
fn budget_end_must_not_precede_start() {
    let f = fixture();
    let err = f
        .db
        .with(|conn| {
            budgets::create(
                &Repo::new(conn, f.alice),
                &NewBudget {
                    name: "Backwards".into(),
                    total_amount: dec("10"),
                    currency: None,
                    start_date: date("2025-06-30"),
                    end_date: date("2025-06-01"),
                },
            )
        })
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

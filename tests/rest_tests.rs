// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use common::*;
use personifi::repo::categories;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn health_needs_no_token() {
    let db = new_db();
    let app = app(&db);
    let (status, body) = send(&app, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_or_bad_token_is_401() {
    let db = new_db();
    let app = app(&db);

    let (status, body) = send(&app, "GET", "/api/v1/accounts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthenticated");

    let (status, _) = send(&app, "GET", "/api/v1/accounts", Some("pfi_nope"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/graphql",
        None,
        Some(json!({ "query": "{ me { email } }" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_the_token_owner() {
    let db = new_db();
    let alice = add_user(&db, "Alice@Example.com");
    let token = token_for(&db, alice);
    let app = app(&db);

    let (status, body) = send(&app, "GET", "/api/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["preferred_currency"], "NGN");

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/v1/users/me",
        Some(&token),
        Some(json!({ "country": "gh", "preferred_currency": "ghs" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"], "GH");
    assert_eq!(body["preferred_currency"], "GHS");

    let (status, body) = send(&app, "GET", "/api/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["next"], serde_json::Value::Null);
    assert_eq!(body["results"][0]["email"], "alice@example.com");
}

#[tokio::test]
async fn account_crud_round() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let token = token_for(&db, alice);
    let app = app(&db);

    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/accounts",
        Some(&token),
        Some(json!({ "name": "Savings", "account_type": "bank", "currency": "usd" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["currency"], "USD");
    assert!(created.get("user_id").is_none());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/v1/accounts/{}", id),
        Some(&token),
        Some(json!({ "institution": "First Bank" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["institution"], "First Bank");
    assert_eq!(updated["name"], "Savings");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/accounts/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/v1/accounts/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lists_are_paginated() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    for name in ["One", "Two", "Three"] {
        account(&db, alice, name, "NGN", "0");
    }
    let token = token_for(&db, alice);
    let app = app(&db);

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/accounts?page_size=2&ordering=name",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["next"], 2);
    assert!(body["previous"].is_null());
    assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["results"][0]["name"], "One");

    let (_, body) = send(
        &app,
        "GET",
        "/api/v1/accounts?page_size=2&page=2&ordering=name",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["results"].as_array().map(Vec::len), Some(1));
    assert!(body["next"].is_null());
    assert_eq!(body["previous"], 1);

    let (status, body) = send(&app, "GET", "/api/v1/accounts?page=0", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field_errors"][0]["field"], "page");

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/accounts?ordering=password",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field_errors"][0]["field"], "ordering");
}

#[tokio::test]
async fn foreign_rows_are_404() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let bob = add_user(&db, "bob@example.com");
    let acct = account(&db, alice, "Main", "NGN", "10.00");
    let bob_token = token_for(&db, bob);
    let app = app(&db);
    let uri = format!("/api/v1/accounts/{}", acct.id);

    for method in ["GET", "DELETE"] {
        let (status, body) = send(&app, method, &uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", method);
        assert_eq!(body["error"]["code"], "not_found");
    }
    let (status, _) = send(
        &app,
        "PATCH",
        &uri,
        Some(&bob_token),
        Some(json!({ "name": "Taken" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/api/v1/accounts", Some(&bob_token), None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn invalid_bodies_are_400() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let token = token_for(&db, alice);
    let app = app(&db);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts",
        Some(&token),
        Some(json!({ "name": "  ", "account_type": "bank", "currency": "naira" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_failed");
    let fields: Vec<&str> = body["error"]["details"]["field_errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"currency"));

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/accounts")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        "/api/v1/accounts/not-a-uuid",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transactions_summary_follows_filters() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let main = account(&db, alice, "Main", "NGN", "0");
    let side = account(&db, alice, "Side", "NGN", "0");
    let token = token_for(&db, alice);
    let app = app(&db);

    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(&token),
        Some(json!({
            "account_id": main.id,
            "amount": "250.00",
            "transaction_type": "income",
            "payment_method": "bank_transfer",
            "description": "Refund"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["currency"], "NGN");
    assert_eq!(created["date"], Utc::now().date_naive().to_string());

    tx(&db, alice, &main, None, personifi::models::TransactionType::Expense, "100.00", "2025-02-01");
    tx(&db, alice, &side, None, personifi::models::TransactionType::Expense, "40.00", "2025-02-02");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/transactions/summary?account={}", main.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_income"], "250.00");
    assert_eq!(body["total_expenses"], "100.00");
    assert_eq!(body["net"], "150.00");

    let (_, body) = send(
        &app,
        "GET",
        "/api/v1/transactions/by_category",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body[0]["category"], "Uncategorized");
    assert_eq!(body[0]["count"], 3);

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/transactions?search=refund",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn system_categories_cannot_be_deleted() {
    let db = new_db();
    db.with(|conn| categories::seed_system(conn, Utc::now()))
        .unwrap();
    let alice = add_user(&db, "alice@example.com");
    let token = token_for(&db, alice);
    let app = app(&db);

    let (_, body) = send(
        &app,
        "GET",
        "/api/v1/categories?category_type=income&page_size=100",
        Some(&token),
        None,
    )
    .await;
    let salary = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Salary")
        .cloned()
        .unwrap();
    assert_eq!(salary["is_system"], true);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/categories/{}", salary["id"].as_str().unwrap()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "permission_denied");
}

#[tokio::test]
async fn notifications_mark_read() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let token = token_for(&db, alice);
    let app = app(&db);

    let mut ids = Vec::new();
    for title in ["Budget alert", "Goal reached"] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/notifications",
            Some(&token),
            Some(json!({ "title": title, "message": "See details" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["is_read"], false);
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/notifications/{}/mark_read", ids[0]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_read"], true);

    let (_, body) = send(&app, "GET", "/api/v1/notifications/unread", Some(&token), None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/notifications/mark_all_read",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "all marked as read");
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn goals_report_progress() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let token = token_for(&db, alice);
    let app = app(&db);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/goals",
        Some(&token),
        Some(json!({
            "name": "Emergency fund",
            "target_amount": "800.00",
            "current_amount": "200.00",
            "goal_type": "savings"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let progress = body["progress_percentage"].as_str().unwrap();
    assert_eq!(dec(progress), dec("25"));
}

#[tokio::test]
async fn analytics_windows_are_validated() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let token = token_for(&db, alice);
    let app = app(&db);

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/analytics/spending_trends?days=0",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field_errors"][0]["field"], "days");

    let (status, body) = send(&app, "GET", "/api/v1/analytics/net_worth", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accounts_count"], 0);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let db = new_db();
    let app = app(&db);
    let req = Request::builder()
        .uri("/api/v1/health")
        .header("x-request-id", "trace-me-42")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.headers()["x-request-id"], "trace-me-42");

    let req = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let minted = resp.headers()["x-request-id"].to_str().unwrap();
    assert!(minted.starts_with("req-"));
}

#[tokio::test]
async fn search_matches_wildcards_literally() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let token = token_for(&db, alice);
    let main = account(&db, alice, "Main", "NGN", "0");
    tx(&db, alice, &main, None, personifi::models::TransactionType::Expense, "10.00", "2025-03-01");
    tx(&db, alice, &main, None, personifi::models::TransactionType::Expense, "20.00", "2025-03-02");
    let app = app(&db);

    let (status, body) = send(&app, "GET", "/api/v1/transactions?search=%25", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (_, body) = send(&app, "GET", "/api/v1/transactions?search=_", Some(&token), None).await;
    assert_eq!(body["count"], 0);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(&token),
        Some(json!({
            "account_id": main.id,
            "amount": "5.00",
            "transaction_type": "expense",
            "payment_method": "cash",
            "description": "50% off_sale"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, "GET", "/api/v1/transactions?search=%25", Some(&token), None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["description"], "50% off_sale");

    let (_, body) = send(&app, "GET", "/api/v1/transactions?search=F_S", Some(&token), None).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn transactions_inline_account_and_category() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let token = token_for(&db, alice);
    let main = account(&db, alice, "Main", "NGN", "0");
    let food = category(&db, alice, "Food", personifi::models::CategoryType::Expense);
    let lunch = tx(&db, alice, &main, Some(&food), personifi::models::TransactionType::Expense, "12.00", "2025-03-01");
    tx(&db, alice, &main, None, personifi::models::TransactionType::Expense, "3.00", "2025-02-01");
    let app = app(&db);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/transactions/{}", lunch.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account_id"], main.id.to_string());
    assert_eq!(body["account_detail"]["name"], "Main");
    assert_eq!(body["category_detail"]["name"], "Food");
    assert!(body["account_detail"].get("user_id").is_none());

    let (_, body) = send(&app, "GET", "/api/v1/transactions", Some(&token), None).await;
    assert_eq!(body["results"][0]["category_detail"]["name"], "Food");
    assert_eq!(body["results"][1]["account_detail"]["name"], "Main");
    assert!(body["results"][1]["category_detail"].is_null());
}

#[tokio::test]
async fn owner_named_in_body_is_ignored() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let bob = add_user(&db, "bob@example.com");
    let alice_token = token_for(&db, alice);
    let bob_token = token_for(&db, bob);
    let app = app(&db);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/goals",
        Some(&alice_token),
        Some(json!({
            "name": "Car",
            "target_amount": "900.00",
            "goal_type": "purchase",
            "user_id": bob.user_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("user_id").is_none());

    let (_, body) = send(&app, "GET", "/api/v1/goals", Some(&bob_token), None).await;
    assert_eq!(body["count"], 0);
    let (_, body) = send(&app, "GET", "/api/v1/goals", Some(&alice_token), None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Car");
}

#[tokio::test]
async fn notifications_order_by_read_state() {
    let db = new_db();
    let alice = add_user(&db, "alice@example.com");
    let token = token_for(&db, alice);
    let app = app(&db);

    let mut ids = Vec::new();
    for title in ["First", "Second"] {
        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/notifications",
            Some(&token),
            Some(json!({ "title": title, "message": "m" })),
        )
        .await;
        ids.push(body["id"].as_str().unwrap().to_string());
    }
    send(
        &app,
        "POST",
        &format!("/api/v1/notifications/{}/mark_read", ids[0]),
        Some(&token),
        None,
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/notifications?ordering=-is_read",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["title"], "First");
    assert_eq!(body["results"][0]["is_read"], true);

    let (_, body) = send(
        &app,
        "GET",
        "/api/v1/notifications?ordering=is_read",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["results"][0]["title"], "Second");
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! HTTP surface: REST resources under `/api/v1` and the GraphQL endpoint.

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Settings;
use crate::db::Db;
use crate::error::AppResult;
use crate::repo::{PageRequest, PageSpec};

pub mod extract;
pub mod graphql;
pub mod rest;
pub mod trace;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub settings: Arc<Settings>,
    pub schema: graphql::PersonifiSchema,
}

impl AppState {
    pub fn new(db: Db, settings: Settings) -> Self {
        let schema = graphql::build_schema(db.clone());
        Self {
            db,
            settings: Arc::new(settings),
            schema,
        }
    }

    pub fn page_spec(&self, req: PageRequest) -> AppResult<PageSpec> {
        req.resolve(self.settings.page_size, self.settings.max_page_size)
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

pub fn build_router(state: AppState) -> Router {
    use rest::{
        accounts, analytics, budget_categories, budgets, categories, goals, notifications,
        transactions, users,
    };

    let api = Router::new()
        .route("/health", get(health))
        .route("/users", get(users::list))
        .route("/users/me", get(users::me).patch(users::update_me))
        .route("/users/:id", get(users::retrieve))
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/:id",
            get(accounts::retrieve)
                .patch(accounts::update)
                .put(accounts::update)
                .delete(accounts::destroy),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/:id",
            get(categories::retrieve)
                .patch(categories::update)
                .put(categories::update)
                .delete(categories::destroy),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/summary", get(transactions::summary))
        .route("/transactions/by_category", get(transactions::by_category))
        .route(
            "/transactions/:id",
            get(transactions::retrieve)
                .patch(transactions::update)
                .put(transactions::update)
                .delete(transactions::destroy),
        )
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route(
            "/budgets/:id",
            get(budgets::retrieve)
                .patch(budgets::update)
                .put(budgets::update)
                .delete(budgets::destroy),
        )
        .route("/budgets/:id/summary", get(budgets::summary))
        .route(
            "/budget-categories",
            get(budget_categories::list).post(budget_categories::create),
        )
        .route(
            "/budget-categories/:id",
            get(budget_categories::retrieve)
                .patch(budget_categories::update)
                .put(budget_categories::update)
                .delete(budget_categories::destroy),
        )
        .route("/goals", get(goals::list).post(goals::create))
        .route(
            "/goals/:id",
            get(goals::retrieve)
                .patch(goals::update)
                .put(goals::update)
                .delete(goals::destroy),
        )
        .route(
            "/notifications",
            get(notifications::list).post(notifications::create),
        )
        .route("/notifications/unread", get(notifications::unread))
        .route(
            "/notifications/mark_all_read",
            post(notifications::mark_all_read),
        )
        .route(
            "/notifications/:id",
            get(notifications::retrieve)
                .patch(notifications::update)
                .put(notifications::update)
                .delete(notifications::destroy),
        )
        .route(
            "/notifications/:id/mark_read",
            post(notifications::mark_read),
        )
        .route(
            "/analytics/spending_trends",
            get(analytics::spending_trends),
        )
        .route(
            "/analytics/category_breakdown",
            get(analytics::category_breakdown),
        )
        .route(
            "/analytics/income_vs_expenses",
            get(analytics::income_vs_expenses),
        )
        .route("/analytics/net_worth", get(analytics::net_worth))
        .route(
            "/analytics/monthly_summary",
            get(analytics::monthly_summary),
        )
        .route("/graphql", post(graphql::graphql_handler));

    let mut app = Router::new()
        .nest("/api/v1", api)
        .layer(middleware::from_fn(trace::request_tracing));
    if let Some(cors) = cors_layer(&state.settings.cors_origins) {
        app = app.layer(cors);
    }
    app.with_state(state)
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

pub async fn run_server(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Bind {}", addr))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("HTTP server failed")?;
    tracing::info!("shut down");
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! REST handlers. Extractor rejections are taken as `Result`s so malformed
//! input surfaces as a `validation_failed` body instead of axum's plain text.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use uuid::Uuid;

pub mod accounts;
pub mod analytics;
pub mod budget_categories;
pub mod budgets;
pub mod categories;
pub mod goals;
pub mod notifications;
pub mod transactions;
pub mod users;

pub type JsonBody<T> = Result<Json<T>, JsonRejection>;
pub type QueryArgs<T> = Result<Query<T>, QueryRejection>;
pub type IdPath = Result<Path<Uuid>, PathRejection>;

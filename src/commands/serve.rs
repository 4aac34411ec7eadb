// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{self, AppState};
use crate::config::Settings;
use crate::db::Db;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::net::SocketAddr;

pub fn handle(conn: Connection, mut settings: Settings, m: &clap::ArgMatches) -> Result<()> {
    if let Some(bind) = m.get_one::<SocketAddr>("bind") {
        settings.bind = bind.to_string();
    }
    let addr = settings.bind_addr()?;
    tracing::info!(db = %settings.db_path.display(), bind = %addr, "starting server");
    let state = AppState::new(Db::new(conn), settings);
    let runtime = tokio::runtime::Runtime::new().context("Start async runtime")?;
    runtime.block_on(api::run_server(state, addr))
}

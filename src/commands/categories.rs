// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::repo::categories::seed_system;
use crate::utils::pretty_table;
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

use super::cli_error;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("seed", _)) => {
            let (created, refreshed) = seed_system(conn, Utc::now()).map_err(cli_error)?;
            println!(
                "System categories: {} created, {} reactivated",
                created, refreshed
            );
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT name, category_type, is_active FROM categories
                 WHERE is_system = 1 ORDER BY category_type, name",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, bool>(2)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (name, kind, active) = row?;
                data.push(vec![name, kind, if active { "yes" } else { "no" }.to_string()]);
            }
            println!("{}", pretty_table(&["Category", "Type", "Active"], data));
        }
        _ => {}
    }
    Ok(())
}

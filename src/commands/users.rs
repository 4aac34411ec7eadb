// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::NewUser;
use crate::repo::users;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;

use super::cli_error;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let input = NewUser {
        email: sub
            .get_one::<String>("email")
            .cloned()
            .context("--email is required")?,
        first_name: sub.get_one::<String>("first-name").cloned(),
        last_name: sub.get_one::<String>("last-name").cloned(),
        preferred_currency: sub.get_one::<String>("currency").cloned(),
    };
    let user = users::create(conn, &input, Utc::now()).map_err(cli_error)?;
    println!("Added user {} ({})", user.email, user.id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let rows = users::list_all(conn).map_err(cli_error)?;
    if maybe_print_json(sub.get_flag("json"), &rows)? {
        return Ok(());
    }
    let data = rows
        .into_iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.email,
                format!("{} {}", u.first_name, u.last_name).trim().to_string(),
                u.preferred_currency,
                u.date_joined.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Email", "Name", "Currency", "Joined"], data)
    );
    Ok(())
}

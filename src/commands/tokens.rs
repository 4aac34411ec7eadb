// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::{issue_token, list_tokens, revoke_token};
use crate::repo::users;
use crate::utils::pretty_table;
use anyhow::{Context, Result, anyhow};
use chrono::{Duration, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use super::cli_error;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("issue", sub)) => issue(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("revoke", sub)) => {
            let raw = sub.get_one::<String>("id").context("--id is required")?;
            let id = Uuid::parse_str(raw.trim())
                .with_context(|| format!("Invalid token id '{}'", raw))?;
            revoke_token(conn, id, Utc::now()).map_err(cli_error)?;
            println!("Revoked token {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn user_id_for(conn: &Connection, sub: &clap::ArgMatches) -> Result<Uuid> {
    let email = sub
        .get_one::<String>("email")
        .context("--email is required")?;
    let user = users::find_by_email(conn, email)
        .map_err(cli_error)?
        .ok_or_else(|| anyhow!("No user with email '{}'", email))?;
    Ok(user.id)
}

fn issue(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = user_id_for(conn, sub)?;
    let label = sub
        .get_one::<String>("label")
        .map(String::as_str)
        .unwrap_or("cli");
    let ttl = sub
        .get_one::<u32>("ttl-days")
        .map(|d| Duration::days(i64::from(*d)));
    let issued = issue_token(conn, user_id, label, ttl, Utc::now()).map_err(cli_error)?;
    println!("Token id: {}", issued.id);
    if let Some(exp) = issued.expires_at {
        println!("Expires:  {}", exp.to_rfc3339());
    }
    println!("Token:    {}", issued.token);
    println!("Store it now; it cannot be shown again.");
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = user_id_for(conn, sub)?;
    let fmt = |d: Option<chrono::DateTime<Utc>>| {
        d.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let data = list_tokens(conn, user_id)
        .map_err(cli_error)?
        .into_iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.label,
                fmt(Some(t.created_at)),
                fmt(t.expires_at),
                fmt(t.revoked_at),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Label", "Created", "Expires", "Revoked"], data)
    );
    Ok(())
}

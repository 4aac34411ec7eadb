// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;

use personifi::{cli, commands, config::Settings, db, telemetry};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut settings = Settings::from_env()?;
    if let Some(path) = matches.get_one::<PathBuf>("db") {
        settings.db_path = path.clone();
    }
    telemetry::init_tracing(settings.log_json);

    let conn = db::open_or_init(&settings.db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", settings.db_path.display());
        }
        Some(("serve", sub)) => commands::serve::handle(conn, settings, sub)?,
        Some(("user", sub)) => commands::users::handle(&conn, sub)?,
        Some(("token", sub)) => commands::tokens::handle(&conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

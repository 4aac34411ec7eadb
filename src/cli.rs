// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};
use std::net::SocketAddr;
use std::path::PathBuf;

pub fn build_cli() -> Command {
    Command::new("personifi")
        .about("PersoniFi personal-finance backend: REST + GraphQL server and operator tools")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("SQLite database path (overrides PERSONIFI_DB)"),
        )
        .subcommand(Command::new("init").about("Create or upgrade the database schema"))
        .subcommand(
            Command::new("serve").about("Run the HTTP server").arg(
                Arg::new("bind")
                    .long("bind")
                    .value_parser(value_parser!(SocketAddr))
                    .help("Listen address (overrides PERSONIFI_BIND)"),
            ),
        )
        .subcommand(
            Command::new("user")
                .about("Manage users")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("first-name").long("first-name"))
                        .arg(Arg::new("last-name").long("last-name"))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .help("Preferred currency, default NGN"),
                        ),
                )
                .subcommand(
                    Command::new("list").arg(
                        Arg::new("json")
                            .long("json")
                            .action(ArgAction::SetTrue)
                            .help("Output JSON"),
                    ),
                ),
        )
        .subcommand(
            Command::new("token")
                .about("Manage API bearer tokens")
                .subcommand_required(true)
                .subcommand(
                    Command::new("issue")
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("label").long("label").default_value("cli"))
                        .arg(
                            Arg::new("ttl-days")
                                .long("ttl-days")
                                .value_parser(value_parser!(u32).range(1..=3650))
                                .help("Expire after N days; omit for no expiry"),
                        ),
                )
                .subcommand(
                    Command::new("list").arg(Arg::new("email").long("email").required(true)),
                )
                .subcommand(Command::new("revoke").arg(Arg::new("id").long("id").required(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage shared categories")
                .subcommand_required(true)
                .subcommand(Command::new("seed").about("Install or refresh system categories"))
                .subcommand(Command::new("list").about("Show system categories")),
        )
}

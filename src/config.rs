// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 200;

/// Runtime settings. Environment first, CLI flags override afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    /// Raw listen address; only `serve` parses it.
    pub bind: String,
    pub log_json: bool,
    pub page_size: u32,
    pub max_page_size: u32,
    /// Empty means no cross-origin access.
    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("personifi.sqlite"),
            bind: DEFAULT_BIND.to_string(),
            log_json: false,
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            cors_origins: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let db_path = match env::var("PERSONIFI_DB") {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(p.trim()),
            _ => crate::db::default_db_path()?,
        };
        let bind = match env::var("PERSONIFI_BIND") {
            Ok(b) if !b.trim().is_empty() => b.trim().to_string(),
            _ => DEFAULT_BIND.to_string(),
        };
        let page_size = env_u32("PERSONIFI_PAGE_SIZE", DEFAULT_PAGE_SIZE).max(1);
        let max_page_size = env_u32("PERSONIFI_MAX_PAGE_SIZE", DEFAULT_MAX_PAGE_SIZE).max(page_size);
        Ok(Self {
            db_path,
            bind,
            log_json: env_bool("PERSONIFI_LOG_JSON", false),
            page_size,
            max_page_size,
            cors_origins: env_list("PERSONIFI_CORS_ORIGINS"),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid bind address '{}'", self.bind))
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_list(name: &str) -> Vec<String> {
    split_list(&env::var(name).unwrap_or_default())
}

pub fn parse_bool(v: &str) -> Option<bool> {
    match v.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

//! `chorekeeper` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, logging and the database before dispatch.
//! - Keep exit codes stable for cron-driven `generate` runs.

use anyhow::Context;
use chorekeeper_core::{init_logging, open_db, LogSettings};
use chrono::Local;
use clap::Parser;
use log::info;
use rusqlite::Connection;
use std::path::Path;

mod cli;
mod commands;
mod config;
mod output;

use cli::Cli;
use commands::RunContext;
use config::{ChorekeeperConfig, LoggingConfig};

fn main() {
    if let Err(error) = run() {
        eprintln!("chorekeeper error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config =
        ChorekeeperConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    init_logging_or_warn(&config.logging, cli.verbose);

    let mut conn = open_database(&config.database.path)?;
    let ctx = RunContext {
        format: cli.format,
        generation: config.generation.clone(),
        today: Local::now().date_naive(),
    };
    let rendered = commands::dispatch(cli.command, &mut conn, &ctx)?;
    println!("{rendered}");
    Ok(())
}

/// Logging problems are reported but never stop the command.
fn init_logging_or_warn(logging: &LoggingConfig, verbose: bool) {
    let settings =
        LogSettings::new(&logging.level, logging.resolved_dir()).with_echo_warnings(verbose);
    if let Err(err) = init_logging(&settings) {
        eprintln!("chorekeeper warning: logging disabled: {err}");
    }
}

fn open_database(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create database directory '{}'", parent.display())
        })?;
    }
    let conn = open_db(path)
        .with_context(|| format!("failed to open database '{}'", path.display()))?;
    info!(
        "event=cli_db_ready module=cli status=ok path={}",
        path.display()
    );
    Ok(conn)
}

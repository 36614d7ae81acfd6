mod cli;
mod config;
mod db;
mod models;
mod tracking;
mod tui;
mod utils;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;
use tracking::streak::to_calendar_day;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    log::debug!("using database {:?}", db_path);

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    let today = to_calendar_day(&Local::now());

    match cli.command {
        Some(Commands::Period { action }) => handlers::handle_period(&conn, &action, today)?,
        Some(Commands::Cycle { action }) => {
            handlers::handle_cycle(&conn, &config, action.as_ref(), today)?
        }
        Some(Commands::Habit { action }) => handlers::handle_habit(&conn, &action, today)?,
        Some(Commands::Timeline { action }) => handlers::handle_timeline(&conn, &action, today)?,
        Some(Commands::Journal { action }) => {
            handlers::handle_journal(&conn, &config, &action, today)?
        }
        Some(Commands::Stats) => handlers::handle_stats(&conn, &config, today)?,
        Some(Commands::Export { json }) => handlers::handle_export(&conn, json, today)?,
        Some(Commands::Config { action }) => handlers::handle_config(&config, &action)?,

        // No subcommand → launch TUI
        None => tui::app::run(conn, config)?,
    }

    Ok(())
}

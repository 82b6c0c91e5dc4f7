//! Caja Server - shift and day-close backend for restaurant POS
//!
//! # Overview
//!
//! The server owns the cash lifecycle of a branch:
//!
//! - **Shifts** (`api::shifts`): open / close working sessions with a
//!   counted drawer breakdown and cash reconciliation
//! - **Orders** (`api::orders`): minimal sale capture feeding expected
//!   cash and the aggregation views
//! - **Day close** (`api::shifts`, `db::repository::day_report`): the
//!   all-or-nothing end-of-day transaction
//! - **Reports** (`api::reports`, `reports`): day-wise / shift-wise
//!   aggregation, receipt rendering and CSV/Excel/PDF export
//!
//! # Module structure
//!
//! ```text
//! caja-server/src/
//! ├── core/        # config, state, HTTP server
//! ├── api/         # routes and handlers
//! ├── db/          # pool setup and repositories
//! ├── reports/     # aggregation, rendering, export
//! └── utils/       # errors, logging, time, validation
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod reports;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` (if present) and initialize logging
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    let log_dir = format!("{}/logs", config.work_dir.trim_end_matches('/'));
    std::fs::create_dir_all(&log_dir)?;
    init_logger_with_file(Some(&config.log_level), Some(&log_dir));

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______            _
  / ____/___ _      (_)___ _
 / /   / __ `/     / / __ `/
/ /___/ /_/ /     / / /_/ /
\____/\__,_/___  / /\__,_/
          /___/_/
    "#
    );
}

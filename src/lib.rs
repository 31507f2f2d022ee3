//! # Tablet Log
//!
//! Form-intake endpoint for the tablet borrow/return and issue-report log.
//!
//! Each submission is validated, normalized, and appended as one row to a
//! shared sheet; rejected or failed submissions leave an error row instead.
//! The caller only ever receives a status token.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────────────┐   ┌──────────┐
//! │ HTML form │──▶│ IngestionHandler         │──▶│  SQLite   │
//! │  (POST)   │   │ validate→normalize→append│   │  sheet    │
//! └───────────┘   └──────────────────────────┘   └──────────┘
//! ```
//!
//! The pipeline itself lives in [`tablet_log_core`]; this crate supplies
//! configuration, the SQLite row store, and the HTTP server.
//!
//! ## Quick Start
//!
//! ```bash
//! tablet-log init                       # create the sheet and header row
//! tablet-log serve                      # start the intake endpoint
//! tablet-log submit --field name=AB --field grade=1A \
//!     --field type=borrow --field qty=1 # one-off test submission
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Sheet tables |
//! | [`sqlite_store`] | SQLite row store |
//! | [`server`] | HTTP intake endpoint |

pub mod config;
pub mod db;
pub mod migrate;
pub mod server;
pub mod sqlite_store;

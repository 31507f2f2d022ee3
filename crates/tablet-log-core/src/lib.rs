//! # Tablet Log Core
//!
//! Pure intake logic for the tablet borrow/return log: text sanitization,
//! submission validation, normalization into a canonical record, row layout,
//! the [`RowStore`](store::RowStore) abstraction, and the request handler
//! that ties them together.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Storage backends
//! and the HTTP surface live in the `tablet-log` crate.
//!
//! ```text
//! Submission ──▶ validate ──▶ normalize ──▶ Row ──▶ RowStore::append_row
//!                    │                                   │
//!                    └────────── error row ◀─────────────┘
//! ```

pub mod clock;
pub mod handler;
pub mod init;
pub mod models;
pub mod normalize;
pub mod rules;
pub mod sanitize;
pub mod schema;
pub mod store;
pub mod validate;

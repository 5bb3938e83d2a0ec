//! woo-orders Core - Shared types library.
//!
//! This crate provides the domain model used across all woo-orders components:
//! - `client` - WooCommerce REST client (credentials, orders, statistics)
//! - `cli` - Command-line front end for browsing orders and statistics
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no filesystem access. This keeps it lightweight and lets the
//! paging, filtering and percentage math be tested without a network.
//!
//! # Modules
//!
//! - [`types`] - Orders, line items, statuses, credentials, prices and IDs
//! - [`stats`] - Statistics snapshots, periods and period-over-period deltas
//! - [`pagination`] - Page totals from headers or the short-page heuristic
//! - [`search`] - Client-side order search, status filtering and paging

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pagination;
pub mod search;
pub mod stats;
pub mod types;

pub use pagination::PageTotals;
pub use search::{OrderFilter, StatusFilter, paginate};
pub use stats::{DatePreset, ParsePresetError, Period, StatsSnapshot, percent_change};
pub use types::*;

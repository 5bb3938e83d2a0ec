//! woo-orders Client - WooCommerce REST access layer.
//!
//! # Architecture
//!
//! - [`credentials`] - Cached, durable store for the store URL and API keys
//! - [`client`] - Authenticated request gateway with error normalization
//! - [`orders`] - Paged, filtered order listings and single-order lookups
//! - [`stats`] - Fail-soft statistics snapshots with period comparison
//!
//! A single [`WooClient`] is built once at startup from a [`ClientConfig`]
//! and shared by cloning. It owns the only mutable state: the credential
//! cache.
//!
//! # Example
//!
//! ```rust,ignore
//! use woo_orders_client::{ClientConfig, WooClient, OrderQuery};
//!
//! let client = WooClient::new(&ClientConfig::from_env()?)?;
//! let page = client.list_orders(&OrderQuery::new(1, 20)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod orders;
pub mod stats;

pub use client::{ApiResponse, WooClient};
pub use config::{ClientConfig, ConfigError, credentials_from_env};
pub use credentials::{CredentialBackend, CredentialStore, FileBackend, MemoryBackend};
pub use error::WooError;
pub use orders::{OrderPage, OrderQuery};
pub use stats::{CustomerSummary, SalesReport, aggregate, fail_soft};

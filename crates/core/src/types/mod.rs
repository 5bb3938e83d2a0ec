//! Core types for woo-orders.
//!
//! This module provides type-safe wrappers for the WooCommerce order model.

pub mod credential;
pub mod id;
pub mod order;
pub mod price;
pub mod status;

pub use credential::Credentials;
pub use id::*;
pub use order::{BillingAddress, LineItem, LineItemImage, Order, ShippingAddress, parse_timestamp};
pub use price::Price;
pub use status::OrderStatus;

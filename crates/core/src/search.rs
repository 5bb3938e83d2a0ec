//! Client-side search and filtering over an already-fetched order list.
//!
//! The list view fetches one page of orders and then narrows it locally as
//! the user types, without another round trip.

use serde::{Deserialize, Serialize};

use crate::types::{Order, OrderStatus};

/// Status filter for the order list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    /// Every status, including ones outside the core set.
    #[default]
    All,
    /// Exactly one status.
    Only(OrderStatus),
}

impl StatusFilter {
    /// Whether `status` passes this filter.
    #[must_use]
    pub fn matches(&self, status: &OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    /// The status to forward to the API, if any.
    #[must_use]
    pub const fn as_status(&self) -> Option<&OrderStatus> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("any") {
            Ok(Self::All)
        } else {
            Ok(Self::Only(OrderStatus::from(s.to_string())))
        }
    }
}

/// Search term plus status filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Free-text search. Empty matches everything.
    pub search: String,
    pub status: StatusFilter,
}

impl OrderFilter {
    /// Create a filter.
    #[must_use]
    pub fn new(search: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            search: search.into(),
            status,
        }
    }

    /// Whether `order` matches.
    ///
    /// The search is case-insensitive and matches the order number, the
    /// billing `"first last"` name or the billing email.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        if !self.status.matches(&order.status) {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let billing_name = format!("{} {}", order.billing.first_name, order.billing.last_name);
        [
            order.number.as_str(),
            billing_name.as_str(),
            order.billing.email.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Orders matching this filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|order| self.matches(order)).collect()
    }
}

/// One page of `items`, 1-indexed. Out-of-range pages are empty.
#[must_use]
pub fn paginate<T>(items: &[T], page: u32, per_page: u32) -> &[T] {
    let page = page.max(1) as usize;
    let per_page = per_page.max(1) as usize;
    let start = (page - 1).saturating_mul(per_page);
    let end = start.saturating_add(per_page).min(items.len());
    items.get(start..end).unwrap_or(&[])
}

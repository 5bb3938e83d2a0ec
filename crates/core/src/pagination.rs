//! Page totals for offset-paged order listings.
//!
//! The store reports the true totals in the `X-WP-Total` and
//! `X-WP-TotalPages` response headers. When those are missing (a proxy
//! stripped them, a caching plugin rewrote the response) the totals are
//! estimated from the size of the page that came back. The estimate is an
//! approximation and is flagged as such through [`PageTotals::exact`].

use serde::{Deserialize, Serialize};

/// Total result count and page count for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTotals {
    /// Total number of results (a lower bound when `exact` is false and
    /// `has_more` is true).
    pub total: u64,
    /// Total number of pages (likewise a lower bound when estimated).
    pub total_pages: u32,
    /// Whether this page is known or assumed to be the last one.
    pub is_last_page: bool,
    /// Whether the numbers came from the server rather than the heuristic.
    pub exact: bool,
}

impl PageTotals {
    /// Totals reported by the server.
    #[must_use]
    pub const fn from_server(page: u32, total: u64, total_pages: u32) -> Self {
        Self {
            total,
            total_pages,
            is_last_page: page >= total_pages,
            exact: true,
        }
    }

    /// Estimate totals from the number of results on `page`.
    ///
    /// A short page (fewer than `per_page` results) is assumed to be the
    /// last: the total is everything on the previous pages plus this one.
    /// A full page is assumed to have at least one more page after it.
    #[must_use]
    pub fn estimate(page: u32, per_page: u32, returned: usize) -> Self {
        let page = page.max(1);
        let per_page = u64::from(per_page.max(1));
        let returned = returned as u64;
        let before = u64::from(page - 1) * per_page;

        if returned < per_page {
            Self {
                total: before + returned,
                total_pages: page,
                is_last_page: true,
                exact: false,
            }
        } else {
            Self {
                total: before + returned,
                total_pages: page.saturating_add(1),
                is_last_page: false,
                exact: false,
            }
        }
    }

    /// Prefer server totals, fall back to the estimate.
    #[must_use]
    pub fn resolve(
        page: u32,
        per_page: u32,
        returned: usize,
        server_total: Option<u64>,
        server_total_pages: Option<u32>,
    ) -> Self {
        match (server_total, server_total_pages) {
            (Some(total), Some(total_pages)) => Self::from_server(page, total, total_pages),
            (Some(total), None) => {
                let per_page = u64::from(per_page.max(1));
                let pages = u32::try_from(total.div_ceil(per_page)).unwrap_or(u32::MAX);
                Self::from_server(page, total, pages)
            }
            _ => Self::estimate(page, per_page, returned),
        }
    }

    /// Whether another page is known or assumed to exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        !self.is_last_page
    }
}

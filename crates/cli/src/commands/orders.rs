//! Order listing and detail commands.

use woo_orders_client::OrderQuery;
use woo_orders_core::{OrderFilter, OrderId, OrderStatus, StatusFilter, paginate};

use super::{CommandError, client};
use crate::output;

/// How many recent orders a search looks through.
const SEARCH_WINDOW: u32 = 50;

/// Arguments for `woo-orders orders`.
#[derive(Debug, Clone)]
pub struct ListArgs {
    pub page: u32,
    pub per_page: u32,
    pub status: StatusFilter,
    pub search: Option<String>,
    pub json: bool,
}

/// List orders.
///
/// Without `--search` the store pages the results. With it, the most recent
/// orders are fetched once, filtered locally and paged locally.
pub async fn list(args: &ListArgs) -> Result<(), CommandError> {
    let client = client()?;

    if let Some(status) = args.status.as_status().filter(|s| !s.is_known()) {
        let known = OrderStatus::KNOWN.map(|s| s.as_str().to_string()).join(", ");
        tracing::warn!(
            status = status.as_str(),
            %known,
            "Not a core order status, sending it as given"
        );
    }

    let mut query = OrderQuery::new(args.page, args.per_page);
    query.status = args.status.as_status().cloned();

    let Some(search) = args.search.as_deref() else {
        let page = client.list_orders(&query).await?;
        return if args.json {
            output::json(&page)
        } else {
            output::order_page(&page);
            Ok(())
        };
    };

    query.page = 1;
    query.per_page = SEARCH_WINDOW;
    let recent = client.list_orders(&query).await?;

    let filter = OrderFilter::new(search, args.status.clone());
    let matches: Vec<_> = filter.apply(&recent.orders).into_iter().cloned().collect();
    tracing::debug!(
        searched = recent.orders.len(),
        matched = matches.len(),
        "Filtered recent orders"
    );

    let shown = paginate(&matches, args.page, args.per_page);
    if args.json {
        output::json(&shown)
    } else {
        output::search_results(shown, matches.len(), search);
        Ok(())
    }
}

/// Show one order.
pub async fn show(id: u64, json: bool) -> Result<(), CommandError> {
    let client = client()?;
    let order = client.get_order(OrderId::new(id)).await?;

    if json {
        output::json(&order)
    } else {
        output::order_detail(&order);
        Ok(())
    }
}

//! Terminal rendering. The only module that writes to stdout.

#![allow(clippy::print_stdout)]

use serde::Serialize;
use woo_orders_client::OrderPage;
use woo_orders_core::{CustomerId, Order, StatsSnapshot};

use crate::commands::CommandError;

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn connection_ok() {
    println!("Connected to WooCommerce.");
}

pub fn order_page(page: &OrderPage) {
    order_table(&page.orders);

    let totals = &page.totals;
    let approx = if totals.exact { "" } else { "~" };
    println!();
    println!(
        "Page {} of {approx}{} ({approx}{} orders){}",
        page.page,
        totals.total_pages,
        totals.total,
        if totals.has_more() { ", more available" } else { "" },
    );
}

pub fn search_results(orders: &[Order], matched: usize, search: &str) {
    order_table(orders);
    println!();
    println!(
        "{matched} order{} matching \"{search}\"",
        if matched == 1 { "" } else { "s" }
    );
}

fn order_table(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders found.");
        return;
    }

    println!(
        "{:<10} {:<20} {:<12} {:<28} {:>12}",
        "NUMBER", "DATE", "STATUS", "CUSTOMER", "TOTAL"
    );
    for order in orders {
        println!(
            "{:<10} {:<20} {:<12} {:<28} {:>12}",
            format!("#{}", order.number),
            order
                .created_at()
                .map_or_else(|| order.date_created.clone(), |dt| dt.format("%Y-%m-%d %H:%M").to_string()),
            order.status.label(),
            truncate(&order.customer_name(), 28),
            order.total_price().display(),
        );
    }
}

pub fn order_detail(order: &Order) {
    println!("Order #{} ({})", order.number, order.status.label());
    println!("Placed: {}", order.date_created);
    if !order.payment_method_title.is_empty() {
        println!("Payment: {}", order.payment_method_title);
    }

    println!();
    println!("Customer: {}", customer_account(order.customer_id));
    println!("Billing: {}", order.customer_name());
    for line in order.billing.lines() {
        println!("  {line}");
    }
    if !order.billing.email.is_empty() {
        println!("  {}", order.billing.email);
    }
    if !order.billing.phone.is_empty() {
        println!("  {}", order.billing.phone);
    }

    if !order.shipping.is_empty() {
        println!();
        println!("Shipping: {}", order.shipping.full_name());
        for line in order.shipping.lines() {
            println!("  {line}");
        }
    }

    println!();
    println!("Items ({}):", order.item_count());
    for item in &order.line_items {
        let sku = item
            .sku
            .as_deref()
            .map(|sku| format!(" [{sku}]"))
            .unwrap_or_default();
        println!(
            "  {} x {}{sku}  {}",
            item.quantity,
            item.name,
            order.price(item.total).display()
        );
    }

    println!();
    println!("Subtotal: {}", order.price(order.subtotal()).display());
    if !order.discount_total.is_zero() {
        println!("Discount: -{}", order.price(order.discount_total).display());
    }
    println!("Shipping: {}", order.price(order.shipping_total).display());
    println!("Tax:      {}", order.price(order.total_tax).display());
    println!("Total:    {}", order.total_price().display());

    if let Some(note) = &order.customer_note {
        println!();
        println!("Customer note: {note}");
    }
}

pub fn stats(snapshot: &StatsSnapshot, label: &str) {
    println!("{label}");
    println!(
        "  Revenue:   {}{}",
        snapshot.revenue().display(),
        change(snapshot.revenue_change)
    );
    println!(
        "  Orders:    {}{}",
        snapshot.total_orders,
        change(snapshot.orders_change)
    );
    println!(
        "  Items:     {}{}",
        snapshot.total_items,
        change(snapshot.sales_change)
    );
    println!(
        "  Customers: {}{}",
        snapshot.active_customers,
        change(snapshot.customers_change)
    );
}

fn change(delta: Option<f64>) -> String {
    delta.map_or_else(String::new, |d| format!("  ({d:+.1}%)"))
}

fn customer_account(id: CustomerId) -> String {
    if id.is_unset() {
        "Guest checkout".to_string()
    } else {
        format!("#{id}")
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let cut: String = value.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_format() {
        assert_eq!(change(Some(50.0)), "  (+50.0%)");
        assert_eq!(change(Some(-12.34)), "  (-12.3%)");
        assert_eq!(change(None), "");
    }

    #[test]
    fn test_customer_account() {
        assert_eq!(customer_account(CustomerId::new(0)), "Guest checkout");
        assert_eq!(customer_account(CustomerId::new(17)), "#17");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Ada Lovelace", 28), "Ada Lovelace");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}

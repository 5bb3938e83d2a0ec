//! woo-orders CLI - Browse WooCommerce orders and store statistics.
//!
//! # Usage
//!
//! ```bash
//! # Store credentials and check them against the store
//! woo-orders setup --url https://shop.example.com --key ck_... --secret cs_...
//!
//! # Newest orders, 20 per page
//! woo-orders orders --page 1 --per-page 20 --status processing
//!
//! # Search the most recent orders by number, name or email
//! woo-orders orders --search jane
//!
//! # One order in full
//! woo-orders order 1234
//!
//! # Last 30 days compared with the 30 days before
//! woo-orders stats --range last30d --compare
//! ```
//!
//! # Commands
//!
//! - `setup` - Store credentials and test the connection
//! - `test` - Test the stored credentials
//! - `orders` - List orders
//! - `order` - Show one order
//! - `stats` - Show store statistics
//!
//! Logs go to stderr. Set `WOO_LOG_JSON=1` for JSON logs and `RUST_LOG` to
//! change the level.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use woo_orders_core::DatePreset;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "woo-orders")]
#[command(author, version, about = "WooCommerce order viewer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store credentials and test the connection
    Setup {
        /// Store URL (falls back to `WOO_STORE_URL`)
        #[arg(short, long)]
        url: Option<String>,

        /// REST API consumer key (falls back to `WOO_CONSUMER_KEY`)
        #[arg(short, long)]
        key: Option<String>,

        /// REST API consumer secret (falls back to `WOO_CONSUMER_SECRET`)
        #[arg(short, long)]
        secret: Option<String>,
    },
    /// Test the stored credentials
    Test,
    /// List orders, newest first
    Orders {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        per_page: u32,

        /// Order status, or `all`
        #[arg(short, long, default_value = "all")]
        status: String,

        /// Match order number, billing name or email in the most recent orders
        #[arg(long)]
        search: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one order
    Order {
        id: u64,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Show revenue, orders, items sold and customers
    Stats {
        /// Preset range (`last24h`, `last7d`, `last30d`, `last4m`)
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        range: Option<DatePreset>,

        /// First day (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,

        /// Compare with the preceding period of the same length
        #[arg(short, long)]
        compare: bool,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Text logs locally, JSON when `WOO_LOG_JSON` is set. Always to stderr.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "woo_orders_cli=info,woo_orders_client=info".into());

    let is_json = std::env::var("WOO_LOG_JSON").is_ok_and(|v| !v.is_empty() && v != "0");
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Setup { url, key, secret } => {
            commands::setup::run(url, key, secret).await?;
        }
        Commands::Test => commands::setup::test().await?,
        Commands::Orders {
            page,
            per_page,
            status,
            search,
            json,
        } => {
            let args = commands::orders::ListArgs {
                page,
                per_page,
                status: status.parse()?,
                search,
                json,
            };
            commands::orders::list(&args).await?;
        }
        Commands::Order { id, json } => commands::orders::show(id, json).await?,
        Commands::Stats {
            range,
            from,
            to,
            compare,
            json,
        } => {
            let range = commands::stats::Range::from_args(range, from, to);
            commands::stats::show(range, compare, json).await?;
        }
    }
    Ok(())
}

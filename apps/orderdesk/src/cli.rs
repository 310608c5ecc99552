//! # Command Line Interface
//!
//! ```text
//! orderdesk quote 120.00 80.00                 price a basket, no database
//! orderdesk tiers                              tax rate and discount tiers
//! orderdesk customers                          list customers
//! orderdesk add-customer --name .. --email ..  register a customer
//! orderdesk delete-customer <ID>
//! orderdesk orders [--customer ID] [--status S]
//! orderdesk place-order --customer ID Keyboard=120.00 Mouse=80.00
//! orderdesk set-status <ORDER_ID> <STATUS>
//! ```
//!
//! Every command prints JSON on stdout. Failures print the `ApiError`.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::{quote_items, CustomerService, OrderService};
use orderdesk_core::pricing::{DiscountTier, TAX_RATE};
use orderdesk_core::{NewCustomer, NewOrder, NewOrderItem, OrderStatus};
use orderdesk_db::{Database, DbError};

#[derive(Debug, Parser)]
#[command(name = "orderdesk")]
#[command(about = "Customer orders with tiered discounts and tax", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price line items: tier discount, then 15% tax
    Quote {
        /// Line item prices
        #[arg(required = true, allow_hyphen_values = true)]
        prices: Vec<Decimal>,
    },

    /// Print the tax rate and discount tiers
    Tiers,

    /// List customers
    Customers,

    /// Register a customer
    AddCustomer {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Delete a customer without orders
    DeleteCustomer {
        /// Customer id
        id: String,
    },

    /// List orders
    Orders {
        /// Only this customer's orders
        #[arg(long)]
        customer: Option<String>,

        /// Only orders in this status
        #[arg(long)]
        status: Option<OrderStatus>,
    },

    /// Create an order from NAME=PRICE line items
    PlaceOrder {
        /// Customer id
        #[arg(long)]
        customer: String,

        /// Line items, e.g. `Keyboard=120.00`
        #[arg(required = true, value_parser = parse_line_item)]
        items: Vec<NewOrderItem>,
    },

    /// Move an order to a new status
    SetStatus {
        /// Order id
        id: String,

        /// pending, processing, completed or cancelled
        status: OrderStatus,
    },
}

/// Failure of a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Parses `NAME=PRICE`. A bare `NAME` yields an item without a price,
/// which order validation then rejects.
pub fn parse_line_item(raw: &str) -> Result<NewOrderItem, String> {
    match raw.rsplit_once('=') {
        Some((name, price)) => {
            let price: Decimal = price
                .trim()
                .parse()
                .map_err(|_| format!("invalid price in '{}'", raw))?;
            Ok(NewOrderItem::new(name.trim(), price))
        }
        None => Ok(NewOrderItem {
            name: raw.trim().to_string(),
            price: None,
        }),
    }
}

/// Tax rate and tier table as JSON.
pub fn tiers_json() -> Value {
    let tiers: Vec<Value> = DiscountTier::ALL
        .iter()
        .map(|tier| {
            json!({
                "tier": tier,
                "label": tier.label(),
                "threshold": tier.threshold(),
                "rate": tier.rate(),
            })
        })
        .collect();

    json!({ "taxRate": TAX_RATE, "tiers": tiers })
}

/// Runs one command and returns its JSON output.
///
/// `quote` and `tiers` never open the database.
pub async fn run(cli: Cli, config: &AppConfig) -> Result<Value, CliError> {
    match cli.cmd {
        Command::Quote { prices } => quote_json(prices),
        Command::Tiers => Ok(tiers_json()),
        cmd => {
            let db = Database::new(config.db_config()).await?;
            let output = run_with_db(cmd, &db).await;
            db.close().await;
            output
        }
    }
}

fn quote_json(prices: Vec<Decimal>) -> Result<Value, CliError> {
    let items: Vec<NewOrderItem> = prices
        .into_iter()
        .enumerate()
        .map(|(i, price)| NewOrderItem::new(format!("item {}", i + 1), price))
        .collect();
    Ok(serde_json::to_value(quote_items(&items)?)?)
}

async fn run_with_db(cmd: Command, db: &Database) -> Result<Value, CliError> {
    let customers = CustomerService::new(db.clone());
    let orders = OrderService::new(db.clone());

    let output = match cmd {
        Command::Quote { prices } => quote_json(prices)?,
        Command::Tiers => tiers_json(),
        Command::Customers => serde_json::to_value(customers.list().await?)?,
        Command::AddCustomer { name, email, phone } => {
            serde_json::to_value(customers.create(NewCustomer { name, email, phone }).await?)?
        }
        Command::DeleteCustomer { id } => {
            customers.delete(&id).await?;
            json!({ "deleted": id })
        }
        Command::Orders { customer, status } => {
            let list = match (customer, status) {
                (Some(customer_id), status) => {
                    let mut list = orders.list_by_customer(&customer_id).await?;
                    if let Some(status) = status {
                        list.retain(|order| order.status == status);
                    }
                    list
                }
                (None, Some(status)) => orders.list_by_status(status).await?,
                (None, None) => orders.list().await?,
            };
            serde_json::to_value(list)?
        }
        Command::PlaceOrder { customer, items } => serde_json::to_value(
            orders
                .create(NewOrder {
                    customer_id: customer,
                    items,
                })
                .await?,
        )?,
        Command::SetStatus { id, status } => {
            serde_json::to_value(orders.update_status(&id, status).await?)?
        }
    };

    Ok(output)
}

//! # Seed Data Generator
//!
//! Populates the database with demo customers and priced orders for
//! development.
//!
//! ## Usage
//! ```bash
//! # 25 customers (default), each with a handful of orders
//! cargo run -p orderdesk-db --bin seed
//!
//! # Custom amount and database path
//! cargo run -p orderdesk-db --bin seed -- --customers 100 --db ./data/orderdesk.db
//! ```
//!
//! Order baskets are sized so every discount tier shows up: small baskets
//! stay under $100, the largest ones cross $1,000.

use chrono::Utc;
use orderdesk_core::pricing::quote;
use orderdesk_core::{Customer, NewCustomer, Order, OrderItem, OrderStatus};
use orderdesk_db::{Database, DbConfig};
use rust_decimal::Decimal;
use std::env;
use uuid::Uuid;

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elena", "Felipe", "Gabriela", "Hugo", "Isabel", "Jorge",
];

const LAST_NAMES: &[&str] = &[
    "Pérez", "Gómez", "Torres", "Vega", "Morales", "Castro", "Rojas", "Silva",
];

/// Catalog of (item name, price in cents).
const CATALOG: &[(&str, i64)] = &[
    ("USB-C Cable", 1299),
    ("Wireless Mouse", 2499),
    ("Mechanical Keyboard", 8999),
    ("27\" Monitor", 32900),
    ("Laptop Stand", 4550),
    ("Webcam HD", 6975),
    ("Noise-Cancelling Headphones", 24999),
    ("Docking Station", 18900),
    ("Office Chair", 41000),
    ("Standing Desk", 69900),
];

/// Statuses handed out round-robin so every filter has data.
const STATUSES: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut customers: usize = 25;
    let mut db_path = String::from("./orderdesk_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--customers" | "-c" => {
                if i + 1 < args.len() {
                    customers = args[i + 1].parse().unwrap_or(25);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("OrderDesk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --customers <N>  Number of customers to generate (default: 25)");
                println!("  -d, --db <PATH>      Database file path (default: ./orderdesk_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("OrderDesk Seed Data Generator");
    println!("=============================");
    println!("Database:  {}", db_path);
    println!("Customers: {}", customers);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.customers().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} customers", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut orders_created = 0usize;

    for n in 0..customers {
        let customer = db.customers().create(&demo_customer(n)).await?;

        for k in 0..(n % 4 + 1) {
            let seed = n * 7 + k;
            let (order, items) = demo_order(&customer, seed)?;
            if let Err(e) = db.orders().insert_with_items(&order, &items).await {
                eprintln!("Failed to insert order for {}: {}", customer.email, e);
                continue;
            }
            orders_created += 1;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Generated {} customers and {} orders in {:?}",
        customers, orders_created, elapsed
    );

    for status in STATUSES {
        let count = db.orders().list_by_status(*status).await?.len();
        println!("  {:<10} {}", status.as_str(), count);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn demo_customer(n: usize) -> NewCustomer {
    let first = FIRST_NAMES[n % FIRST_NAMES.len()];
    let last = LAST_NAMES[(n / FIRST_NAMES.len()) % LAST_NAMES.len()];

    NewCustomer {
        name: format!("{} {}", first, last),
        email: format!(
            "{}.{}{}@example.com",
            first.to_lowercase(),
            n,
            if n % 3 == 0 { "+orders" } else { "" }
        ),
        phone: (n % 2 == 0).then(|| format!("+5939{:08}", 10_000_000 + n)),
    }
}

/// Builds an order whose basket grows with `seed`, priced with the same
/// pipeline the order service uses.
fn demo_order(
    customer: &Customer,
    seed: usize,
) -> Result<(Order, Vec<OrderItem>), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let order_id = Uuid::new_v4().to_string();

    let item_count = seed % 5 + 1;
    let items: Vec<OrderItem> = (0..item_count)
        .map(|position| {
            let (name, price_cents) = CATALOG[(seed * 3 + position * 5) % CATALOG.len()];
            OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                position: position as i64,
                name: name.to_string(),
                price_cents,
                created_at: now,
            }
        })
        .collect();

    let subtotal_cents: i64 = items.iter().map(|item| item.price_cents).sum();
    let breakdown = quote(Decimal::new(subtotal_cents, 2))?;

    let cents = |m: orderdesk_core::Money| {
        m.to_cents()
            .ok_or_else(|| format!("amount {} does not fit in cents", m))
    };

    let order = Order {
        id: order_id,
        customer_id: customer.id.clone(),
        status: STATUSES[seed % STATUSES.len()],
        subtotal_cents: cents(breakdown.subtotal)?,
        discount_cents: cents(breakdown.discount)?,
        tax_cents: cents(breakdown.tax)?,
        total_cents: cents(breakdown.total)?,
        created_at: now,
        updated_at: now,
    };

    Ok((order, items))
}

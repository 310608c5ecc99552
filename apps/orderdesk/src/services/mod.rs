//! # Services
//!
//! Application operations on top of the pricing engine and the database.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caller (CLI, tests)                                                    │
//! │       │  NewOrder { customer_id, items }                               │
//! │       ▼                                                                 │
//! │  OrderService::create                                                   │
//! │  ├── validation::line_items_subtotal   (items present, price > 0)      │
//! │  ├── customers().exists                (unknown customer → NOT_FOUND)  │
//! │  ├── pricing::quote                    (discount → round → tax → round)│
//! │  └── orders().insert_with_items        (one transaction)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderDto  ──or──  ApiError { code, message }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod order;

pub use customer::{CustomerDto, CustomerService};
pub use order::{quote_items, OrderDto, OrderItemDto, OrderService};

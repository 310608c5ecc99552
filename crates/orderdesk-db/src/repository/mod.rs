//! # Repository Module
//!
//! Database repository implementations for OrderDesk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderService                                                          │
//! │       │                                                                 │
//! │       │  db.orders().insert_with_items(&order, &items)                 │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert_with_items(&self, order, items)                            │
//! │  ├── get_details(&self, id)                                            │
//! │  └── update_status(&self, id, from, to)                                │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customer CRUD and email lookup
//! - [`order::OrderRepository`] - Orders and their line items

pub mod customer;
pub mod order;

//! # orderdesk-core: Pure Business Logic for OrderDesk
//!
//! This crate is the **heart** of OrderDesk. It contains the pricing engine,
//! the money type, domain types and validation rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OrderDesk Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/orderdesk (services + CLI)                 │   │
//! │  │     CustomerService, OrderService, `orderdesk quote ...`        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ orderdesk-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │   money   │  │   types   │  │ validation│  │   │
//! │  │   │ discount  │  │   Money   │  │ Customer  │  │   rules   │  │   │
//! │  │   │    tax    │  │  (2 dp)   │  │   Order   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 orderdesk-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pricing`] - Tiered discount, tax, and final total calculation
//! - [`money`] - Money type over fixed-point decimals (no floating point!)
//! - [`types`] - Domain types (Customer, Order, OrderItem, OrderStatus)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use orderdesk_core::pricing;
//! use rust_decimal_macros::dec;
//!
//! // $200.00 gets the 5% tier: 190.00, then 15% tax
//! let total = pricing::calculate_final_total(dec!(200)).unwrap();
//! assert_eq!(total.amount(), dec!(218.50));
//! ```

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, PricingError, ValidationError};
pub use money::Money;
pub use pricing::{DiscountTier, PriceBreakdown};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single order.
///
/// ## Business Reason
/// Prevents runaway requests and keeps orders at a reasonable size.
pub const MAX_ORDER_ITEMS: usize = 100;

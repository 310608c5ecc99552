//! # Order Service
//!
//! Order creation prices the basket with [`orderdesk_core::pricing::quote`]
//! and stores the resulting breakdown next to the items, so a stored order
//! always reproduces `calculate_final_total(subtotal)`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiResult;
use orderdesk_core::pricing::{self, DiscountTier, PriceBreakdown};
use orderdesk_core::validation::{line_items_subtotal, validate_line_item_price, validate_uuid};
use orderdesk_core::{
    CoreError, Money, NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, OrderStatus,
};
use orderdesk_db::Database;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub position: i64,
    pub name: String,
    pub price: Money,
}

/// Order with its items and price breakdown, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItemDto>,
    pub subtotal: Money,
    pub tier: DiscountTier,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderDetails> for OrderDto {
    fn from(details: OrderDetails) -> Self {
        let OrderDetails { order, items } = details;
        let subtotal = order.subtotal();

        OrderDto {
            id: order.id.clone(),
            customer_id: order.customer_id.clone(),
            status: order.status,
            items: items
                .into_iter()
                .map(|item| OrderItemDto {
                    position: item.position,
                    price: item.price(),
                    name: item.name,
                })
                .collect(),
            subtotal,
            tier: DiscountTier::for_amount(subtotal.amount()),
            discount: order.discount(),
            tax: order.tax(),
            total: order.total(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Validates line items and prices them without touching the database.
///
/// ## Example
/// ```rust
/// use orderdesk::services::quote_items;
/// use orderdesk_core::NewOrderItem;
/// use rust_decimal_macros::dec;
///
/// let quote = quote_items(&[
///     NewOrderItem::new("Keyboard", dec!(120.00)),
///     NewOrderItem::new("Mouse", dec!(80.00)),
/// ])
/// .unwrap();
/// assert_eq!(quote.total.amount(), dec!(218.50));
/// ```
pub fn quote_items(items: &[NewOrderItem]) -> ApiResult<PriceBreakdown> {
    let subtotal = line_items_subtotal(items)?;
    Ok(pricing::quote(subtotal)?)
}

fn to_cents(amount: Money) -> Result<i64, CoreError> {
    amount
        .to_cents()
        .ok_or(CoreError::AmountOutOfRange(amount.amount()))
}

fn price_cents(price: Option<Decimal>) -> ApiResult<i64> {
    let price = validate_line_item_price(price)?;
    Ok(to_cents(Money::from_decimal(price))?)
}

// =============================================================================
// Service
// =============================================================================

/// Order placement, lookup and lifecycle.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    /// Places an order.
    ///
    /// ## Steps
    /// 1. Items: non-empty, each with a name and a price > 0
    /// 2. Customer must exist
    /// 3. Subtotal → tier discount → tax, via `pricing::quote`
    /// 4. Order and items stored in one transaction, status `pending`
    ///
    /// ## Errors
    /// * `VALIDATION_ERROR` - bad items or customer id
    /// * `NOT_FOUND` - unknown customer
    pub async fn create(&self, input: NewOrder) -> ApiResult<OrderDto> {
        debug!(
            customer_id = %input.customer_id,
            items = input.items.len(),
            "create order"
        );

        validate_uuid("customer_id", &input.customer_id)?;
        let breakdown = quote_items(&input.items)?;

        let customer_id = input.customer_id.trim();
        if !self.db.customers().exists(customer_id).await? {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            status: OrderStatus::Pending,
            subtotal_cents: to_cents(breakdown.subtotal)?,
            discount_cents: to_cents(breakdown.discount)?,
            tax_cents: to_cents(breakdown.tax)?,
            total_cents: to_cents(breakdown.total)?,
            created_at: now,
            updated_at: now,
        };

        let items = input
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| -> ApiResult<OrderItem> {
                Ok(OrderItem {
                    id: Uuid::new_v4().to_string(),
                    order_id: order.id.clone(),
                    position: position as i64,
                    name: item.name.trim().to_string(),
                    price_cents: price_cents(item.price)?,
                    created_at: now,
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;

        self.db.orders().insert_with_items(&order, &items).await?;

        info!(
            id = %order.id,
            customer_id = %order.customer_id,
            subtotal = %breakdown.subtotal,
            tier = breakdown.tier.label(),
            total = %breakdown.total,
            "Order created"
        );

        Ok(OrderDetails { order, items }.into())
    }

    /// Lists all orders.
    pub async fn list(&self) -> ApiResult<Vec<OrderDto>> {
        let orders = self.db.orders().list().await?;
        self.with_items(orders).await
    }

    /// Gets one order with its items.
    pub async fn get(&self, id: &str) -> ApiResult<OrderDto> {
        let details = self
            .db
            .orders()
            .get_details(id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;

        Ok(details.into())
    }

    /// Lists a customer's orders. Unknown customers are `NOT_FOUND`.
    pub async fn list_by_customer(&self, customer_id: &str) -> ApiResult<Vec<OrderDto>> {
        if !self.db.customers().exists(customer_id).await? {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
        }

        let orders = self.db.orders().list_by_customer(customer_id).await?;
        self.with_items(orders).await
    }

    /// Lists orders currently in `status`.
    pub async fn list_by_status(&self, status: OrderStatus) -> ApiResult<Vec<OrderDto>> {
        let orders = self.db.orders().list_by_status(status).await?;
        self.with_items(orders).await
    }

    /// Moves an order along its lifecycle.
    ///
    /// ```text
    /// pending ──► processing ──► completed
    ///    │             │
    ///    └─────────────┴──────► cancelled
    /// ```
    ///
    /// ## Errors
    /// * `NOT_FOUND` - unknown order
    /// * `BUSINESS_LOGIC` - transition not allowed from the current status
    pub async fn update_status(&self, id: &str, next: OrderStatus) -> ApiResult<OrderDto> {
        let current = self
            .db
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;

        let invalid = |from: OrderStatus| CoreError::InvalidStatusTransition {
            order_id: id.to_string(),
            from: from.to_string(),
            to: next.to_string(),
        };

        if !current.status.can_transition_to(next) {
            return Err(invalid(current.status).into());
        }

        let updated = match self
            .db
            .orders()
            .update_status(id, current.status, next)
            .await
        {
            Ok(order) => order,
            Err(orderdesk_db::DbError::NotFound { .. }) => {
                // Status changed between the read and the guarded update
                warn!(id = %id, expected = %current.status, "Order status changed concurrently");
                let latest = self
                    .db
                    .orders()
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;
                return Err(invalid(latest.status).into());
            }
            Err(e) => return Err(e.into()),
        };

        info!(id = %id, from = %current.status, to = %next, "Order status updated");

        let items = self.db.orders().get_items(id).await?;
        Ok(OrderDetails {
            order: updated,
            items,
        }
        .into())
    }

    /// Prices line items without creating an order.
    pub fn quote(&self, items: &[NewOrderItem]) -> ApiResult<PriceBreakdown> {
        quote_items(items)
    }

    async fn with_items(&self, orders: Vec<Order>) -> ApiResult<Vec<OrderDto>> {
        let mut dtos = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.db.orders().get_items(&order.id).await?;
            dtos.push(OrderDetails { order, items }.into());
        }
        Ok(dtos)
    }
}

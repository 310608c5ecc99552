//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. insert_with_items(order, items)  ── one transaction                │
//! │     └── INSERT orders + INSERT order_items (all or nothing)            │
//! │                                                                         │
//! │  2. get_details(id)                                                     │
//! │     └── order row + items ordered by position                          │
//! │                                                                         │
//! │  3. update_status(id, from, to)                                         │
//! │     └── UPDATE ... WHERE id = ? AND status = <from>                    │
//! │         (a concurrent change makes the update match zero rows)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are stored as integer cents; see [`orderdesk_core::Money`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use orderdesk_core::{Order, OrderDetails, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, customer_id, status, subtotal_cents, discount_cents, \
                             tax_cents, total_cents, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, position, name, price_cents, created_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists an order and all of its line items atomically.
    ///
    /// ## Errors
    /// * `DbError::ForeignKeyViolation` - `order.customer_id` does not exist
    /// * `DbError::CheckViolation` - a negative amount or non-positive price
    ///
    /// Nothing is written when any statement fails.
    pub async fn insert_with_items(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(
            id = %order.id,
            customer_id = %order.customer_id,
            items = items.len(),
            total_cents = order.total_cents,
            "Inserting order"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, status,
                subtotal_cents, discount_cents, tax_cents, total_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.tax_cents)
        .bind(order.total_cents)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, position, name, price_cents, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(item.position)
            .bind(&item.name)
            .bind(item.price_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %order.id, "Order stored");
        Ok(())
    }

    /// Gets an order header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let query = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets the line items of an order in the order they were entered.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let query = format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY position",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Gets an order together with its line items.
    pub async fn get_details(&self, id: &str) -> DbResult<Option<OrderDetails>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.get_items(id).await?;

        Ok(Some(OrderDetails { order, items }))
    }

    /// Lists all orders, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let query = format!(
            "SELECT {} FROM orders ORDER BY created_at, rowid",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Lists the orders placed by one customer, oldest first.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        let query = format!(
            "SELECT {} FROM orders WHERE customer_id = ?1 ORDER BY created_at, rowid",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Lists the orders currently in `status`, oldest first.
    pub async fn list_by_status(&self, status: OrderStatus) -> DbResult<Vec<Order>> {
        let query = format!(
            "SELECT {} FROM orders WHERE status = ?1 ORDER BY created_at, rowid",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Moves an order from `from` to `to`.
    ///
    /// The update only applies while the stored status still equals `from`.
    /// Transition legality is checked by the caller.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no order with that ID in status `from`
    pub async fn update_status(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<Order> {
        debug!(id = %id, from = %from, to = %to, "Updating order status");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("Order ({})", from), id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::DateTime;
    use orderdesk_core::{Customer, NewCustomer};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn customer(db: &Database, email: &str) -> Customer {
        db.customers()
            .create(&NewCustomer {
                name: "Test Customer".to_string(),
                email: email.to_string(),
                phone: None,
            })
            .await
            .unwrap()
    }

    fn order_for(customer_id: &str, now: DateTime<Utc>) -> Order {
        // 100.00 + 75.00 = 175.00 → 166.25 after 5% → 191.19 with tax
        Order {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            status: OrderStatus::Pending,
            subtotal_cents: 17500,
            discount_cents: 875,
            tax_cents: 2494,
            total_cents: 19119,
            created_at: now,
            updated_at: now,
        }
    }

    fn items_for(order: &Order) -> Vec<OrderItem> {
        [("Keyboard", 10000), ("Mouse", 7500)]
            .iter()
            .enumerate()
            .map(|(i, (name, cents))| OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                position: i as i64,
                name: name.to_string(),
                price_cents: *cents,
                created_at: order.created_at,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_insert_and_get_details() {
        let db = test_db().await;
        let ana = customer(&db, "ana@example.com").await;
        let repo = db.orders();

        let order = order_for(&ana.id, Utc::now());
        let items = items_for(&order);
        repo.insert_with_items(&order, &items).await.unwrap();

        let details = repo.get_details(&order.id).await.unwrap().unwrap();
        assert_eq!(details.order.status, OrderStatus::Pending);
        assert_eq!(details.order.total_cents, 19119);
        assert_eq!(details.items.len(), 2);
        assert_eq!(details.items[0].name, "Keyboard");
        assert_eq!(details.items[1].name, "Mouse");

        assert!(repo.get_details("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_customer_rejected_atomically() {
        let db = test_db().await;
        let repo = db.orders();

        let order = order_for("no-such-customer", Utc::now());
        let items = items_for(&order);
        let err = repo.insert_with_items(&order, &items).await.unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.get_items(&order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_item_rolls_back_order() {
        let db = test_db().await;
        let ana = customer(&db, "ana@example.com").await;
        let repo = db.orders();

        let order = order_for(&ana.id, Utc::now());
        let mut items = items_for(&order);
        items[1].price_cents = 0;

        let err = repo.insert_with_items(&order, &items).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_customer_with_orders_cannot_be_deleted() {
        let db = test_db().await;
        let ana = customer(&db, "ana@example.com").await;

        let order = order_for(&ana.id, Utc::now());
        db.orders()
            .insert_with_items(&order, &items_for(&order))
            .await
            .unwrap();

        assert_eq!(db.customers().count_orders(&ana.id).await.unwrap(), 1);
        let err = db.customers().delete(&ana.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(db.customers().exists(&ana.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        let ana = customer(&db, "ana@example.com").await;
        let bob = customer(&db, "bob@example.com").await;
        let repo = db.orders();

        for owner in [&ana, &ana, &bob] {
            let order = order_for(&owner.id, Utc::now());
            repo.insert_with_items(&order, &items_for(&order))
                .await
                .unwrap();
        }

        assert_eq!(repo.list().await.unwrap().len(), 3);
        assert_eq!(repo.list_by_customer(&ana.id).await.unwrap().len(), 2);
        assert_eq!(repo.list_by_customer(&bob.id).await.unwrap().len(), 1);
        assert_eq!(
            repo.list_by_status(OrderStatus::Pending).await.unwrap().len(),
            3
        );
        assert!(repo
            .list_by_status(OrderStatus::Completed)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_status_guarded_by_current_status() {
        let db = test_db().await;
        let ana = customer(&db, "ana@example.com").await;
        let repo = db.orders();

        let order = order_for(&ana.id, Utc::now());
        repo.insert_with_items(&order, &items_for(&order))
            .await
            .unwrap();

        let updated = repo
            .update_status(&order.id, OrderStatus::Pending, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Processing);

        // Stale `from` no longer matches the stored row
        let err = repo
            .update_status(&order.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let stored = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Processing);
    }
}

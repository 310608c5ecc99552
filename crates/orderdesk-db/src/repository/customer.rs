//! # Customer Repository
//!
//! Database operations for customers.
//!
//! ## Integrity Rules Enforced Here
//! - Email is unique, compared case-insensitively (`COLLATE NOCASE`)
//! - A customer that still owns orders cannot be deleted (`ON DELETE RESTRICT`)

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use orderdesk_core::{Customer, CustomerUpdate, NewCustomer};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

/// Maps a unique-index failure on insert/update to a duplicate email error.
fn email_conflict(email: &str) -> impl FnOnce(sqlx::Error) -> DbError + '_ {
    move |err| match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("email", email),
        other => other,
    }
}

fn clean_phone(phone: &Option<String>) -> Option<String> {
    phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Registers a customer and returns the stored record.
    ///
    /// Name and email are trimmed; an empty phone is stored as NULL.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the email is already registered
    pub async fn create(&self, input: &NewCustomer) -> DbResult<Customer> {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: clean_phone(&input.phone),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %customer.id, email = %customer.email, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, phone, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(email_conflict(&customer.email))?;

        Ok(customer)
    }

    /// Gets a customer by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - No customer with that ID
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let query = format!("SELECT {} FROM customers WHERE id = ?1", CUSTOMER_COLUMNS);
        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Finds a customer by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let query = format!("SELECT {} FROM customers WHERE email = ?1", CUSTOMER_COLUMNS);
        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Checks whether a customer with this ID exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE id = ?1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(found != 0)
    }

    /// Checks whether an email is registered, optionally ignoring one customer
    /// (the one being updated).
    pub async fn email_exists(&self, email: &str, excluding_id: Option<&str>) -> DbResult<bool> {
        let found: i64 = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM customers
                WHERE email = ?1 AND (?2 IS NULL OR id <> ?2)
            )
            "#,
        )
        .bind(email.trim())
        .bind(excluding_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(found != 0)
    }

    /// Lists all customers, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let query = format!(
            "SELECT {} FROM customers ORDER BY created_at, rowid",
            CUSTOMER_COLUMNS
        );
        let customers = sqlx::query_as::<_, Customer>(&query)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = customers.len(), "Listed customers");
        Ok(customers)
    }

    /// Replaces a customer's name, email and phone.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no customer with that ID
    /// * `DbError::UniqueViolation` - the new email belongs to another customer
    pub async fn update(&self, id: &str, input: &CustomerUpdate) -> DbResult<Customer> {
        let now = Utc::now();
        let email = input.email.trim();

        debug!(id = %id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                phone = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(email)
        .bind(clean_phone(&input.phone))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(email_conflict(email))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no customer with that ID
    /// * `DbError::ForeignKeyViolation` - the customer still owns orders
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Counts the orders that reference a customer.
    pub async fn count_orders(&self, id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts all customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_customer(name: &str, email: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let repo = db.customers();

        let created = repo
            .create(&NewCustomer {
                name: "  Ana Pérez ".to_string(),
                email: "ana@example.com ".to_string(),
                phone: Some("  ".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Ana Pérez");
        assert_eq!(created.email, "ana@example.com");
        assert_eq!(created.phone, None);

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.email, created.email);
        assert!(repo.exists(&created.id).await.unwrap());
        assert!(!repo.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_case_insensitive() {
        let db = test_db().await;
        let repo = db.customers();

        repo.create(&new_customer("Ana", "ana@example.com")).await.unwrap();
        let err = repo
            .create(&new_customer("Other Ana", "ANA@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
        assert_eq!(repo.count().await.unwrap(), 1);

        let found = repo.find_by_email("Ana@Example.com").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_email_exists_excluding_self() {
        let db = test_db().await;
        let repo = db.customers();

        let ana = repo.create(&new_customer("Ana", "ana@example.com")).await.unwrap();

        assert!(repo.email_exists("ana@example.com", None).await.unwrap());
        assert!(!repo
            .email_exists("ana@example.com", Some(&ana.id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update() {
        let db = test_db().await;
        let repo = db.customers();

        let ana = repo.create(&new_customer("Ana", "ana@example.com")).await.unwrap();
        let bob = repo.create(&new_customer("Bob", "bob@example.com")).await.unwrap();

        let updated = repo
            .update(
                &ana.id,
                &CustomerUpdate {
                    name: "Ana María".to_string(),
                    email: "ana.maria@example.com".to_string(),
                    phone: Some("+593991234567".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana María");
        assert_eq!(updated.phone.as_deref(), Some("+593991234567"));

        let err = repo
            .update(
                &bob.id,
                &CustomerUpdate {
                    name: "Bob".to_string(),
                    email: "ana.maria@example.com".to_string(),
                    phone: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let err = repo
            .update(
                "missing",
                &CustomerUpdate {
                    name: "Nobody".to_string(),
                    email: "nobody@example.com".to_string(),
                    phone: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let db = test_db().await;
        let repo = db.customers();

        let ana = repo.create(&new_customer("Ana", "ana@example.com")).await.unwrap();
        repo.create(&new_customer("Bob", "bob@example.com")).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Ana");

        repo.delete(&ana.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        let err = repo.delete(&ana.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

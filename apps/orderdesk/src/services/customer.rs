//! # Customer Service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use orderdesk_core::validation::{validate_customer_name, validate_email, validate_phone};
use orderdesk_core::{CoreError, Customer, CustomerUpdate, NewCustomer, ValidationError};
use orderdesk_db::Database;

/// Customer as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerDto {
    fn from(customer: Customer) -> Self {
        CustomerDto {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

fn validate_contact(name: &str, email: &str, phone: Option<&str>) -> Result<(), ValidationError> {
    validate_customer_name(name)?;
    validate_email(email)?;
    if let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) {
        validate_phone(phone)?;
    }
    Ok(())
}

fn duplicate_email(email: &str) -> ApiError {
    ValidationError::Duplicate {
        field: "email".to_string(),
        value: email.trim().to_string(),
    }
    .into()
}

/// Customer registration and maintenance.
#[derive(Debug, Clone)]
pub struct CustomerService {
    db: Database,
}

impl CustomerService {
    pub fn new(db: Database) -> Self {
        CustomerService { db }
    }

    /// Registers a new customer.
    ///
    /// ## Errors
    /// * `VALIDATION_ERROR` - bad name, email or phone
    /// * `CONFLICT` - email already registered (case-insensitive)
    pub async fn create(&self, input: NewCustomer) -> ApiResult<CustomerDto> {
        debug!(email = %input.email, "create customer");

        validate_contact(&input.name, &input.email, input.phone.as_deref())?;

        if self.db.customers().email_exists(&input.email, None).await? {
            return Err(duplicate_email(&input.email));
        }

        let customer = self.db.customers().create(&input).await?;

        info!(id = %customer.id, "Customer created");
        Ok(customer.into())
    }

    /// Lists all customers.
    pub async fn list(&self) -> ApiResult<Vec<CustomerDto>> {
        let customers = self.db.customers().list().await?;
        Ok(customers.into_iter().map(CustomerDto::from).collect())
    }

    /// Gets one customer.
    pub async fn get(&self, id: &str) -> ApiResult<CustomerDto> {
        let customer = self
            .db
            .customers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))?;

        Ok(customer.into())
    }

    /// Replaces a customer's contact details.
    pub async fn update(&self, id: &str, input: CustomerUpdate) -> ApiResult<CustomerDto> {
        debug!(id = %id, "update customer");

        validate_contact(&input.name, &input.email, input.phone.as_deref())?;

        if !self.db.customers().exists(id).await? {
            return Err(CoreError::CustomerNotFound(id.to_string()).into());
        }

        if self
            .db
            .customers()
            .email_exists(&input.email, Some(id))
            .await?
        {
            return Err(duplicate_email(&input.email));
        }

        let customer = self.db.customers().update(id, &input).await?;

        info!(id = %customer.id, "Customer updated");
        Ok(customer.into())
    }

    /// Deletes a customer that has no orders.
    ///
    /// ## Errors
    /// * `NOT_FOUND` - unknown customer
    /// * `CONFLICT` - the customer still owns orders
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        debug!(id = %id, "delete customer");

        if !self.db.customers().exists(id).await? {
            return Err(CoreError::CustomerNotFound(id.to_string()).into());
        }

        let order_count = self.db.customers().count_orders(id).await?;
        if order_count > 0 {
            return Err(CoreError::CustomerHasOrders {
                customer_id: id.to_string(),
                order_count,
            }
            .into());
        }

        self.db.customers().delete(id).await?;

        info!(id = %id, "Customer deleted");
        Ok(())
    }

    /// Whether a customer with this ID exists.
    pub async fn exists(&self, id: &str) -> ApiResult<bool> {
        Ok(self.db.customers().exists(id).await?)
    }
}

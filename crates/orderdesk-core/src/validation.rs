//! # Validation Module
//!
//! Input validation for customers and orders.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Shape and types of the request                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Names, email and phone formats                                    │
//! │  └── Line items: present, price > 0, at most 2 decimals                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE email                                                      │
//! │  ├── CHECK price_cents > 0                                             │
//! │  └── Foreign keys (order → customer)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line items are checked here, before the pricing engine ever runs; the
//! engine itself only rejects negative subtotals.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::MONEY_SCALE;
use crate::types::NewOrderItem;
use crate::MAX_ORDER_ITEMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Customer Validators
// =============================================================================

/// Validates a customer name (required, at most 200 characters).
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required("name", name, MAX_NAME_LEN)
}

/// Validates an email address.
///
/// ## Rules
/// - Required, at most 254 characters
/// - `local@domain.tld` with exactly one `@`
/// - Local part: letters, digits, `+ _ . -`
/// - Domain: letters, digits, `.` and `-`, ending in a dot and a
///   top-level label of at least two letters
///
/// ## Example
/// ```rust
/// use orderdesk_core::validation::validate_email;
///
/// assert!(validate_email("ana.perez@example.com").is_ok());
/// assert!(validate_email("ana@localhost").is_err());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    required("email", email, MAX_EMAIL_LEN)?;
    let email = email.trim();

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing '@'"))?;

    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '_' | '.' | '-'))
    {
        return Err(invalid("invalid characters before '@'"));
    }

    if domain.is_empty()
        || !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
    {
        return Err(invalid("invalid domain"));
    }

    let (host, tld) = domain
        .rsplit_once('.')
        .ok_or_else(|| invalid("domain must contain a '.'"))?;

    if host.is_empty() || tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid("invalid top-level domain"));
    }

    Ok(())
}

/// Validates a phone number: optional leading `+`, then 7 to 15 digits.
///
/// ## Example
/// ```rust
/// use orderdesk_core::validation::validate_phone;
///
/// assert!(validate_phone("+593991234567").is_ok());
/// assert!(validate_phone("12345").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);

    if !(7..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be an optional '+' followed by 7 to 15 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates a line item name (required, at most 200 characters).
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    required("item name", name, MAX_NAME_LEN)
}

/// Validates a line item price.
///
/// ## Rules
/// - Must be present
/// - Must be strictly positive (a free or negative line is rejected)
/// - At most 2 decimal places, so it is storable as integer cents
///
/// ## Example
/// ```rust
/// use orderdesk_core::validation::validate_line_item_price;
/// use rust_decimal_macros::dec;
///
/// assert!(validate_line_item_price(Some(dec!(19.99))).is_ok());
/// assert!(validate_line_item_price(Some(dec!(0))).is_err());
/// assert!(validate_line_item_price(Some(dec!(1.005))).is_err());
/// assert!(validate_line_item_price(None).is_err());
/// ```
pub fn validate_line_item_price(price: Option<Decimal>) -> ValidationResult<Decimal> {
    let price = price.ok_or_else(|| ValidationError::Required {
        field: "price".to_string(),
    })?;

    if price <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if price.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::TooManyDecimals {
            field: "price".to_string(),
            max: MONEY_SCALE,
        });
    }

    Ok(price)
}

/// Validates the full list of line items of an order.
///
/// ## Rules
/// - At least one item
/// - No more than `MAX_ORDER_ITEMS` (100)
/// - Every item has a name and a valid price
pub fn validate_order_items(items: &[NewOrderItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    for item in items {
        validate_item_name(&item.name)?;
        validate_line_item_price(item.price)?;
    }

    Ok(())
}

/// Validates the items and sums their prices into the order subtotal.
///
/// ## Example
/// ```rust
/// use orderdesk_core::types::NewOrderItem;
/// use orderdesk_core::validation::line_items_subtotal;
/// use rust_decimal_macros::dec;
///
/// let items = vec![
///     NewOrderItem::new("Keyboard", dec!(120.00)),
///     NewOrderItem::new("Mouse", dec!(80.00)),
/// ];
/// assert_eq!(line_items_subtotal(&items).unwrap(), dec!(200.00));
/// ```
pub fn line_items_subtotal(items: &[NewOrderItem]) -> ValidationResult<Decimal> {
    validate_order_items(items)?;

    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        let price = validate_line_item_price(item.price)?;
        acc.checked_add(price).ok_or_else(|| ValidationError::OutOfRange {
            field: "subtotal".to_string(),
            min: 0,
            max: i64::MAX,
        })
    })
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("Ana Pérez").is_ok());
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("   ").is_err());
        assert!(validate_customer_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.co").is_ok());
        assert!(validate_email("  padded@example.org  ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@").is_err());
        assert!(validate_email("ana@example").is_err());
        assert!(validate_email("ana@example.c").is_err());
        assert!(validate_email("ana@example.c0m").is_err());
        assert!(validate_email("ana@@example.com").is_err());
        assert!(validate_email("ana pérez@example.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0991234567").is_ok());
        assert!(validate_phone("+593991234567").is_ok());
        assert!(validate_phone("1234567").is_ok());

        assert!(validate_phone("").is_err());
        assert!(validate_phone("123456").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        assert!(validate_phone("099-123-4567").is_err());
    }

    #[test]
    fn test_validate_line_item_price() {
        assert_eq!(validate_line_item_price(Some(dec!(0.01))).unwrap(), dec!(0.01));
        assert!(validate_line_item_price(Some(dec!(10.500))).is_ok());

        assert!(matches!(
            validate_line_item_price(None),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_line_item_price(Some(dec!(0))),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_line_item_price(Some(dec!(-5))),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_line_item_price(Some(dec!(9.999))),
            Err(ValidationError::TooManyDecimals { .. })
        ));
    }

    #[test]
    fn test_validate_order_items() {
        assert!(matches!(
            validate_order_items(&[]),
            Err(ValidationError::Required { .. })
        ));

        let too_many: Vec<NewOrderItem> = (0..=MAX_ORDER_ITEMS)
            .map(|i| NewOrderItem::new(format!("item {}", i), dec!(1)))
            .collect();
        assert!(matches!(
            validate_order_items(&too_many),
            Err(ValidationError::OutOfRange { .. })
        ));

        let unnamed = vec![NewOrderItem::new(" ", dec!(1))];
        assert!(validate_order_items(&unnamed).is_err());
    }

    #[test]
    fn test_line_items_subtotal() {
        let items = vec![
            NewOrderItem::new("Desk", dec!(450.00)),
            NewOrderItem::new("Lamp", dec!(49.99)),
            NewOrderItem::new("Cable", dec!(0.01)),
        ];
        assert_eq!(line_items_subtotal(&items).unwrap(), dec!(500.00));

        let with_free_item = vec![
            NewOrderItem::new("Desk", dec!(450.00)),
            NewOrderItem::new("Sticker", dec!(0)),
        ];
        assert!(line_items_subtotal(&with_free_item).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }
}

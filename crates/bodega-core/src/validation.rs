//! # Validation Module
//!
//! Input validation utilities for Bodega.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Shape and range checks (THIS MODULE)                         │
//! │  ├── Run by the repositories before any transaction is opened          │
//! │  └── Failures surface as {success: false, message} at the boundary     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Transactional checks (bodega-db)                             │
//! │  ├── Stock sufficiency, status preconditions, balance gates            │
//! │  └── Read and decided inside the same transaction                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK(stock >= 0) constraints                          │
//! │  └── UNIQUE receipt numbers, wallet date primary key                   │
//! │                                                                         │
//! │  Defense in depth: each layer catches what the one above cannot        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bodega_core::validation::{validate_item_name, validate_quantity};
//!
//! validate_item_name("Lucky Me Pancit Canton").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::LineItemDraft;
use crate::{MAX_ITEM_QUANTITY, MAX_LINE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an inventory item name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use bodega_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Sardinas 155g").is_ok());
/// assert!(validate_item_name("").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "item name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "item name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 100 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an entity id passed from a caller.
///
/// Ids come in two schemes (UUIDs for items/customers/entries, `sale-NNNNNN`
/// for sales), so the only universal rule is non-emptiness.
pub fn validate_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates an optional free-text description.
///
/// ## Rules
/// - Absent or empty is fine
/// - Must be at most 500 characters
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    if let Some(text) = description {
        if text.len() > 500 {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: 500,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (giveaway items)
///
/// ## Example
/// ```rust
/// use bodega_core::money::Money;
/// use bodega_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(1099)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a credit or payment amount.
///
/// ## Rules
/// - Must be positive (> 0)
/// - A zero-amount ledger entry records nothing and is rejected
pub fn validate_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a cash count for a wallet session.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (a drawer can open or close empty)
pub fn validate_cash(cash: Money) -> ValidationResult<()> {
    if cash.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "cash".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a list of line items before commit.
///
/// ## Rules
/// - Must contain at least one line
/// - Must not exceed MAX_LINE_ITEMS (100) lines
/// - Every line must pass the name, quantity, and price validators
///
/// ## Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Commit Sale / Commit Credit                                            │
/// │                                                                         │
/// │  Caller submits line items                                              │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_line_items(&items) ← THIS FUNCTION                           │
/// │       │                                                                 │
/// │       ├── empty? → Error: "line items is required"                     │
/// │       ├── > 100 lines? → Error: out of range                           │
/// │       ├── any bad name/qty/price? → that line's error                  │
/// │       │                                                                 │
/// │       └── OK → resolve, reserve stock, write, all in one transaction   │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_line_items(items: &[LineItemDraft]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "line items".to_string(),
        });
    }

    if items.len() > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "line items".to_string(),
            min: 1,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    for item in items {
        validate_item_name(&item.item_name)?;
        validate_quantity(item.quantity)?;
        validate_price(item.unit_price)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, qty: i64, price: i64) -> LineItemDraft {
        LineItemDraft {
            item_id: None,
            item_name: name.to_string(),
            quantity: qty,
            unit_price: Money::from_cents(price),
        }
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Sardinas 155g").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("Aling Nena").is_ok());
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name(&"A".repeat(150)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(1099)).is_ok());
        assert!(validate_price(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(Money::from_cents(100)).is_ok());
        assert!(validate_amount(Money::zero()).is_err());
        assert!(validate_amount(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_cash() {
        assert!(validate_cash(Money::zero()).is_ok());
        assert!(validate_cash(Money::from_cents(50000)).is_ok());
        assert!(validate_cash(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_line_items() {
        assert!(validate_line_items(&[draft("Asin", 2, 1500)]).is_ok());

        // empty list
        assert!(validate_line_items(&[]).is_err());

        // bad line inside an otherwise fine list
        assert!(validate_line_items(&[draft("Asin", 2, 1500), draft("", 1, 100)]).is_err());
        assert!(validate_line_items(&[draft("Asin", 0, 1500)]).is_err());
        assert!(validate_line_items(&[draft("Asin", 2, -5)]).is_err());

        // too many lines
        let many: Vec<_> = (0..101).map(|i| draft(&format!("Item {i}"), 1, 100)).collect();
        assert!(validate_line_items(&many).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("groceries for the week")).is_ok());
        assert!(validate_description(Some(&"A".repeat(600))).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("sale-000042").is_ok());
        assert!(validate_id("").is_err());
        assert!(validate_id("  ").is_err());
    }
}

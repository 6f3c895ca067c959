//! # Payment Allocation
//!
//! Pure allocation of a payment across a customer's open credits.
//!
//! ## FIFO Walk
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  allocate_fifo(credits oldest-first, payment = 120)                     │
//! │                                                                         │
//! │  Credit 1: amount 100, paid   0  ──► apply 100 ──► paid 100 (full)      │
//! │  Credit 2: amount  50, paid   0  ──► apply  20 ──► paid  20             │
//! │  Credit 3: amount 200, paid   0  ──► (payment exhausted, untouched)     │
//! │                                                                         │
//! │  allocated = 120, leftover = 0                                          │
//! │                                                                         │
//! │  A payment larger than everything open leaves a leftover: the excess    │
//! │  is attributed to no credit, and the balance floors at zero.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Balance: One Source of Truth
//! A customer's outstanding balance is **Σ over active credits of
//! `amount − paid_amount`**, nothing else. Payments are allocation records:
//! they change balances only through the `paid_amount` they write onto
//! credits. Summing payment amounts independently against the balance would
//! double-count, and is deliberately not done anywhere.

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Allocation Input / Output
// =============================================================================

/// A credit's identity and payoff state, as read inside the payment
/// transaction.
#[derive(Debug, Clone)]
pub struct OpenCredit {
    pub id: String,
    pub amount: Money,
    pub paid_amount: Money,
}

impl OpenCredit {
    /// The unpaid portion of this credit.
    #[inline]
    pub fn remaining(&self) -> Money {
        self.amount.saturating_sub(self.paid_amount)
    }
}

/// One credit's updated payoff state after allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditPayoff {
    pub credit_id: String,
    /// The value to persist as the credit's `paid_amount`.
    pub new_paid_amount: Money,
    /// How much of this payment went to this credit.
    pub applied: Money,
}

/// The complete outcome of allocating one payment.
#[derive(Debug, Clone)]
pub struct PaymentAllocation {
    /// Per-credit updates, in the order they were applied (oldest-first).
    /// Credits the payment never reached do not appear.
    pub payoffs: Vec<CreditPayoff>,
    /// Portion of the payment attributed to credits.
    pub allocated: Money,
    /// Portion left unattributed (payment exceeded everything open).
    pub leftover: Money,
}

impl PaymentAllocation {
    /// Ids of the credits this payment touched.
    pub fn paid_credit_ids(&self) -> Vec<String> {
        self.payoffs.iter().map(|p| p.credit_id.clone()).collect()
    }
}

// =============================================================================
// Allocation
// =============================================================================

/// Allocates a payment across credits oldest-first.
///
/// `credits` must already be ordered oldest-first; the caller's query does
/// that. Fully paid credits are skipped. The walk stops as soon as the
/// payment is exhausted.
///
/// ## Example
/// ```rust
/// use bodega_core::allocate::{allocate_fifo, OpenCredit};
/// use bodega_core::money::Money;
///
/// let credits = vec![OpenCredit {
///     id: "c1".to_string(),
///     amount: Money::from_cents(10000),
///     paid_amount: Money::zero(),
/// }];
///
/// let allocation = allocate_fifo(&credits, Money::from_cents(4000));
/// assert_eq!(allocation.payoffs[0].new_paid_amount.cents(), 4000);
/// assert_eq!(allocation.leftover, Money::zero());
/// ```
pub fn allocate_fifo(credits: &[OpenCredit], amount: Money) -> PaymentAllocation {
    let mut remaining = amount;
    let mut payoffs = Vec::new();

    for credit in credits {
        if remaining.is_zero() {
            break;
        }

        let open = credit.remaining();
        if open.is_zero() {
            continue;
        }

        let applied = remaining.min(open);
        payoffs.push(CreditPayoff {
            credit_id: credit.id.clone(),
            new_paid_amount: credit.paid_amount + applied,
            applied,
        });
        remaining -= applied;
    }

    PaymentAllocation {
        payoffs,
        allocated: amount - remaining,
        leftover: remaining,
    }
}

/// Allocates a payment across an explicitly chosen set of credits.
///
/// The walk is the same oldest-first pass as [`allocate_fifo`], restricted
/// to the selected ids and capped by `amount`. Selection order does not
/// matter; age does. A selected id with no matching open credit fails the
/// whole allocation.
///
/// ## Why Not "Mark Fully Paid"?
/// Marking every selected credit fully paid regardless of the tendered
/// amount would fabricate money whenever the payment is smaller than the
/// selection. The allocation below pays out exactly `amount`, never more.
pub fn allocate_to_credits(
    credits: &[OpenCredit],
    selected_ids: &[String],
    amount: Money,
) -> CoreResult<PaymentAllocation> {
    let known: HashSet<&str> = credits.iter().map(|c| c.id.as_str()).collect();
    for id in selected_ids {
        if !known.contains(id.as_str()) {
            return Err(CoreError::EntryNotFound(id.clone()));
        }
    }

    let wanted: HashSet<&str> = selected_ids.iter().map(String::as_str).collect();
    let selection: Vec<OpenCredit> = credits
        .iter()
        .filter(|c| wanted.contains(c.id.as_str()))
        .cloned()
        .collect();

    Ok(allocate_fifo(&selection, amount))
}

/// Outstanding balance over a set of active credits.
///
/// Never negative: each term saturates at zero, so an overpaid credit
/// contributes nothing rather than a refund.
pub fn outstanding_balance(credits: &[OpenCredit]) -> Money {
    credits.iter().map(OpenCredit::remaining).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Line Item Resolution
//!
//! The pure half of committing a sale or a credit: turning the caller's
//! line items into the exact writes the storage layer must perform.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      resolve_line_items                                 │
//! │                                                                         │
//! │  Drafts (from caller)                                                   │
//! │  ┌──────────────────────────────┐                                       │
//! │  │ {itemId: "i1", qty: 3, ...}  │──┐                                    │
//! │  │ {itemId: "i1", qty: 4, ...}  │──┼─► decrements: {"i1": 7}            │
//! │  │ {itemId: none, "Suka", ...}  │──┼─► new_items:  [{id: new, ...}]     │
//! │  └──────────────────────────────┘  │                                    │
//! │                                    └─► items: resolved lines, each      │
//! │                                        with an id and a recomputed      │
//! │                                        total, plus the grand total      │
//! │                                                                         │
//! │  The storage layer then, inside ONE transaction:                        │
//! │    1. read + validate stock for every decremented id                    │
//! │    2. apply the decrements                                              │
//! │    3. insert the new items                                              │
//! │    4. write the owning sale / credit document                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Pure?
//! Sale commits and credit commits share this algorithm exactly. Keeping it
//! free of I/O means one implementation, one set of tests, and coordinators
//! that only orchestrate reads and writes.
//!
//! Quantities for the same inventory id are summed **before** the stock
//! check: two lines of 3 and 4 against a stock of 5 must fail as a request
//! for 7, not pass as two independent requests.

use std::collections::BTreeMap;

use crate::money::Money;
use crate::types::{LineItem, LineItemDraft};

// =============================================================================
// Resolution Output
// =============================================================================

/// An inventory item to be created as part of the commit.
///
/// Seeded from the line that introduced it: the sale's unit price becomes
/// the item's price. Cost and stock take the store defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItemSpec {
    pub id: String,
    pub name: String,
    pub price: Money,
}

/// Everything the storage layer needs to commit a batch of line items.
#[derive(Debug, Clone)]
pub struct LineItemResolution {
    /// The resolved lines, in caller order. Every line carries an item id
    /// (freshly generated for new items) and a recomputed total.
    pub items: Vec<LineItem>,

    /// Items that must be created before the commit completes.
    pub new_items: Vec<NewItemSpec>,

    /// Aggregated stock decrements for pre-existing items, keyed by item id.
    /// New items never appear here: they did not exist before this commit,
    /// so there is nothing to check or decrement.
    pub decrements: BTreeMap<String, i64>,

    /// Grand total across all lines.
    pub total: Money,
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolves caller line items into creations, aggregated decrements, and
/// final stored lines.
///
/// `new_id` supplies identifiers for items that do not exist yet; callers
/// pass their id generator, tests pass a deterministic counter.
///
/// Line totals are recomputed as `unit_price × quantity`; a total the
/// caller may have sent along is ignored.
///
/// ## Example
/// ```rust
/// use bodega_core::money::Money;
/// use bodega_core::resolve::resolve_line_items;
/// use bodega_core::types::LineItemDraft;
///
/// let drafts = vec![LineItemDraft {
///     item_id: Some("i1".to_string()),
///     item_name: "Sardinas".to_string(),
///     quantity: 2,
///     unit_price: Money::from_cents(2550),
/// }];
///
/// let resolution = resolve_line_items(&drafts, || "unused".to_string());
/// assert_eq!(resolution.decrements["i1"], 2);
/// assert_eq!(resolution.total.cents(), 5100);
/// ```
pub fn resolve_line_items(
    drafts: &[LineItemDraft],
    mut new_id: impl FnMut() -> String,
) -> LineItemResolution {
    let mut items = Vec::with_capacity(drafts.len());
    let mut new_items = Vec::new();
    let mut decrements: BTreeMap<String, i64> = BTreeMap::new();
    let mut total = Money::zero();

    for draft in drafts {
        let line_total = draft.unit_price * draft.quantity;
        total += line_total;

        let item_id = match &draft.item_id {
            Some(id) => {
                *decrements.entry(id.clone()).or_insert(0) += draft.quantity;
                id.clone()
            }
            None => {
                // Each unnamed line creates its own item; lines are not
                // merged by name.
                let id = new_id();
                new_items.push(NewItemSpec {
                    id: id.clone(),
                    name: draft.item_name.trim().to_string(),
                    price: draft.unit_price,
                });
                id
            }
        };

        items.push(LineItem {
            item_id: Some(item_id),
            item_name: draft.item_name.trim().to_string(),
            quantity: draft.quantity,
            unit_price: draft.unit_price,
            total: line_total,
        });
    }

    LineItemResolution {
        items,
        new_items,
        decrements,
        total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(id: &str, qty: i64, price: i64) -> LineItemDraft {
        LineItemDraft {
            item_id: Some(id.to_string()),
            item_name: format!("Item {id}"),
            quantity: qty,
            unit_price: Money::from_cents(price),
        }
    }

    fn fresh(name: &str, qty: i64, price: i64) -> LineItemDraft {
        LineItemDraft {
            item_id: None,
            item_name: name.to_string(),
            quantity: qty,
            unit_price: Money::from_cents(price),
        }
    }

    fn sequential_ids() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("new-{n}")
        }
    }

    #[test]
    fn test_aggregates_quantities_for_same_item() {
        let drafts = vec![existing("i1", 3, 1000), existing("i1", 4, 1000)];
        let res = resolve_line_items(&drafts, sequential_ids());

        assert_eq!(res.decrements.len(), 1);
        assert_eq!(res.decrements["i1"], 7);
        // both lines survive as stored lines
        assert_eq!(res.items.len(), 2);
    }

    #[test]
    fn test_new_items_get_ids_and_skip_decrements() {
        let drafts = vec![fresh("Suka", 1, 2500), existing("i1", 2, 1000)];
        let res = resolve_line_items(&drafts, sequential_ids());

        assert_eq!(res.new_items.len(), 1);
        assert_eq!(
            res.new_items[0],
            NewItemSpec {
                id: "new-1".to_string(),
                name: "Suka".to_string(),
                price: Money::from_cents(2500),
            }
        );

        // the stored line carries the generated id
        assert_eq!(res.items[0].item_id.as_deref(), Some("new-1"));

        // only the existing item is decremented
        assert_eq!(res.decrements.len(), 1);
        assert_eq!(res.decrements["i1"], 2);
    }

    #[test]
    fn test_totals_are_recomputed_per_line() {
        let drafts = vec![existing("i1", 3, 1000), fresh("Suka", 2, 2500)];
        let res = resolve_line_items(&drafts, sequential_ids());

        assert_eq!(res.items[0].total.cents(), 3000);
        assert_eq!(res.items[1].total.cents(), 5000);
        assert_eq!(res.total.cents(), 8000);
    }

    #[test]
    fn test_duplicate_names_create_separate_items() {
        let drafts = vec![fresh("Suka", 1, 2500), fresh("Suka", 1, 2500)];
        let res = resolve_line_items(&drafts, sequential_ids());

        assert_eq!(res.new_items.len(), 2);
        assert_ne!(res.new_items[0].id, res.new_items[1].id);
    }

    #[test]
    fn test_empty_input_resolves_empty() {
        let res = resolve_line_items(&[], sequential_ids());
        assert!(res.items.is_empty());
        assert!(res.new_items.is_empty());
        assert!(res.decrements.is_empty());
        assert_eq!(res.total, Money::zero());
    }

    #[test]
    fn test_item_names_are_trimmed() {
        let drafts = vec![fresh("  Suka  ", 1, 2500)];
        let res = resolve_line_items(&drafts, sequential_ids());

        assert_eq!(res.new_items[0].name, "Suka");
        assert_eq!(res.items[0].item_name, "Suka");
    }
}

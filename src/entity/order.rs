use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{comment_or_placeholder, Dish, Identified};
use crate::clock::format_time;

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub dish_id: u32,
    pub quantity: u32,
}

/// A table's order. Open until `closed_at` is stamped; `total` is only
/// meaningful once closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: u32,
    pub client_id: u32,
    pub table_id: u32,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub comment: String,
    pub created_at: NaiveDateTime,
    pub waiter_id: u32,
    #[serde(default)]
    pub closed_at: Option<NaiveDateTime>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision")]
    pub total: Decimal,
}

impl Order {
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Total number of portions across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn references_dish(&self, dish_id: u32) -> bool {
        self.items.iter().any(|i| i.dish_id == dish_id)
    }

    /// Σ quantity × price. A line whose dish no longer exists counts as zero.
    /// `None` when the sum does not fit in a `Decimal`.
    pub fn compute_total(&self, dishes: &[Dish]) -> Option<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |total, item| {
            let price = dishes
                .iter()
                .find(|d| d.id == item.dish_id)
                .map(|d| d.price)
                .unwrap_or(Decimal::ZERO);
            total.checked_add(price.checked_mul(Decimal::from(item.quantity))?)
        })
    }
}

impl Identified for Order {
    fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID {} | client {} | table {} | items: {} | created: {} | {} | comment: {}",
            self.id,
            self.client_id,
            self.table_id,
            self.item_count(),
            format_time(&self.created_at),
            if self.is_closed() { "closed" } else { "open" },
            comment_or_placeholder(&self.comment)
        )
    }
}

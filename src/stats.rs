//! Read-only reports over the stored data. Nothing here mutates state.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::clock::Clock;
use crate::entity::{Dish, Order, Reservation, Table};
use crate::error::{EntityKind, RestoranError, Result};

fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| RestoranError::validation("total", "sum of order totals is out of range"))
}

/// Sum of the totals of all closed orders.
pub fn closed_revenue(orders: &[Order]) -> Result<Decimal> {
    checked_sum(orders.iter().filter(|o| o.is_closed()).map(|o| o.total))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckLine {
    pub order_id: u32,
    pub closed_at: NaiveDateTime,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total: Decimal,
}

/// Every closed order of one client with a grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientCheck {
    pub client_id: u32,
    pub lines: Vec<CheckLine>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total: Decimal,
}

/// The check for `client_id`, or `None` when they have no closed orders.
pub fn client_check(orders: &[Order], client_id: u32) -> Result<Option<ClientCheck>> {
    let mut lines: Vec<CheckLine> = orders
        .iter()
        .filter(|o| o.client_id == client_id)
        .filter_map(|o| {
            o.closed_at.map(|closed_at| CheckLine {
                order_id: o.id,
                closed_at,
                total: o.total,
            })
        })
        .collect();
    if lines.is_empty() {
        return Ok(None);
    }
    lines.sort_by_key(|l| (l.closed_at, l.order_id));

    let total = checked_sum(lines.iter().map(|l| l.total))?;
    Ok(Some(ClientCheck {
        client_id,
        lines,
        total,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DishSales {
    pub dish_id: u32,
    pub name: String,
    pub quantity: u32,
}

/// Portions sold per dish across closed orders, best sellers first. Lines
/// whose dish has since been removed from the menu are left out.
pub fn dish_sales(orders: &[Order], dishes: &[Dish]) -> Vec<DishSales> {
    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for item in orders.iter().filter(|o| o.is_closed()).flat_map(|o| &o.items) {
        *counts.entry(item.dish_id).or_default() += item.quantity;
    }

    let mut sales: Vec<DishSales> = counts
        .into_iter()
        .filter_map(|(dish_id, quantity)| {
            dishes.iter().find(|d| d.id == dish_id).map(|d| DishSales {
                dish_id,
                name: d.name.clone(),
                quantity,
            })
        })
        .collect();
    sales.sort_by(|a, b| b.quantity.cmp(&a.quantity).then(a.dish_id.cmp(&b.dish_id)));
    sales
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub reservation: Reservation,
    /// The reservation covers the current instant.
    pub active: bool,
}

/// A table together with its bookings in start order.
#[derive(Debug, Clone, Serialize)]
pub struct TableSchedule {
    pub table: Table,
    pub entries: Vec<ScheduleEntry>,
}

impl TableSchedule {
    pub fn is_occupied(&self) -> bool {
        self.entries.iter().any(|e| e.active)
    }
}

pub fn table_schedule(
    tables: &[Table],
    reservations: &[Reservation],
    table_id: u32,
    clock: &dyn Clock,
) -> Result<TableSchedule> {
    let table = tables
        .iter()
        .find(|t| t.id == table_id)
        .cloned()
        .ok_or(RestoranError::not_found(EntityKind::Table, table_id))?;

    let now = clock.now();
    let mut entries: Vec<ScheduleEntry> = reservations
        .iter()
        .filter(|r| r.table_id == table_id)
        .map(|r| ScheduleEntry {
            reservation: r.clone(),
            active: r.covers(now),
        })
        .collect();
    entries.sort_by_key(|e| (e.reservation.start, e.reservation.id));

    Ok(TableSchedule { table, entries })
}

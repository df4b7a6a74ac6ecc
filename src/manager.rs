//! The restaurant's single source of truth.
//!
//! [`RestaurantManager`] owns the four collections and enforces every rule
//! that spans them: reservation periods on one table never overlap, tables
//! and dishes that are still referenced cannot be removed, orders can only be
//! opened against a reservation in effect, and a closed order never changes.
//!
//! Every mutation validates first and only then touches state, so a failed
//! call leaves the collections exactly as they were. When the manager is
//! backed by a [`JsonStore`] each successful mutation is written through
//! immediately.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::clock::{format_time, Clock};
use crate::entity::{next_id, Dish, DishCategory, Order, OrderItem, Reservation, Table};
use crate::error::{Conflict, EntityKind, RestoranError, Result};
use crate::seed;
use crate::storage::{copy_data_files, JsonStore, RestaurantData};
use crate::warnings::Warning;

/// Highest accepted dish price.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Highest accepted portion count on one order line.
pub const MAX_QUANTITY: u32 = 10_000;

/// Payload for a new table
#[derive(Debug, Clone)]
pub struct NewTable {
    pub location: String,
    pub seats: u32,
}

/// Update payload for a table
#[derive(Debug, Clone, Default)]
pub struct TableUpdate {
    pub location: Option<String>,
    pub seats: Option<u32>,
}

/// Payload for a new reservation
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub table_id: u32,
    pub client_id: u32,
    pub client_name: String,
    pub phone: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub comment: Option<String>,
}

/// Update payload for a reservation
#[derive(Debug, Clone, Default)]
pub struct ReservationUpdate {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub client_name: Option<String>,
    pub phone: Option<String>,
    pub comment: Option<Option<String>>, // Some(None) to clear, Some(Some(s)) to set
}

/// Payload for a new dish
#[derive(Debug, Clone)]
pub struct NewDish {
    pub name: String,
    pub composition: String,
    pub weight: String,
    pub price: Decimal,
    pub category: DishCategory,
    pub cook_time_minutes: u32,
}

/// Update payload for a dish
#[derive(Debug, Clone, Default)]
pub struct DishUpdate {
    pub name: Option<String>,
    pub composition: Option<String>,
    pub weight: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<DishCategory>,
    pub cook_time_minutes: Option<u32>,
}

/// Payload for a new order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client_id: u32,
    pub table_id: u32,
    pub waiter_id: u32,
    pub comment: String,
}

pub struct RestaurantManager {
    data: RestaurantData,
    store: Option<JsonStore>,
}

impl RestaurantManager {
    /// A manager that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::with_data(RestaurantData::default())
    }

    pub fn with_data(data: RestaurantData) -> Self {
        Self { data, store: None }
    }

    /// Load everything from `store`. Unreadable files start out empty and are
    /// reported in the returned warnings.
    pub fn open(store: JsonStore) -> (Self, Vec<Warning>) {
        let report = store.load_all();
        let manager = Self {
            data: report.data,
            store: Some(store),
        };
        (manager, report.warnings)
    }

    pub fn data(&self) -> &RestaurantData {
        &self.data
    }

    pub fn tables(&self) -> &[Table] {
        &self.data.tables
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.data.reservations
    }

    pub fn dishes(&self) -> &[Dish] {
        &self.data.dishes
    }

    pub fn orders(&self) -> &[Order] {
        &self.data.orders
    }

    /// Directory the manager writes to, if file-backed.
    pub fn data_dir(&self) -> Option<&Path> {
        self.store.as_ref().map(|s| s.dir())
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Write all collections. A no-op for in-memory managers.
    pub fn save_all(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.save_all(&self.data),
            None => Ok(()),
        }
    }

    /// Replace the in-memory state with what is on disk.
    pub fn load_all(&mut self) -> Vec<Warning> {
        match &self.store {
            Some(store) => {
                let report = store.load_all();
                self.data = report.data;
                report.warnings
            }
            None => Vec::new(),
        }
    }

    /// Switch to another data directory, optionally copying the current
    /// files there first, and reload from it.
    pub fn relocate(&mut self, new_dir: PathBuf, copy_existing: bool) -> Vec<Warning> {
        let mut warnings = Vec::new();
        if copy_existing {
            if let Some(current) = self.data_dir() {
                if current != new_dir.as_path() {
                    warnings.extend(copy_data_files(current, &new_dir));
                }
            }
        }

        let store = JsonStore::new(new_dir);
        if let Err(e) = store.ensure_dir() {
            tracing::warn!(dir = %store.dir().display(), error = %e, "could not create data directory");
        }
        tracing::info!(dir = %store.dir().display(), "switched data directory");
        self.store = Some(store);
        warnings.extend(self.load_all());
        warnings
    }

    /// Write through after a successful mutation. The in-memory state stays
    /// authoritative if the write fails.
    fn persist(&self) -> Result<()> {
        self.save_all().map_err(|e| {
            tracing::warn!(error = %e, "failed to persist restaurant data");
            RestoranError::Storage(format!("changes kept in memory but not saved: {}", e))
        })
    }

    // ---------------------------------------------------------------------
    // Ids and lookups
    // ---------------------------------------------------------------------

    pub fn next_table_id(&self) -> u32 {
        next_id(&self.data.tables)
    }

    pub fn next_reservation_id(&self) -> u32 {
        next_id(&self.data.reservations)
    }

    pub fn next_dish_id(&self) -> u32 {
        next_id(&self.data.dishes)
    }

    pub fn next_order_id(&self) -> u32 {
        next_id(&self.data.orders)
    }

    pub fn get_table(&self, id: u32) -> Result<&Table> {
        self.data
            .tables
            .iter()
            .find(|t| t.id == id)
            .ok_or(RestoranError::not_found(EntityKind::Table, id))
    }

    pub fn get_reservation(&self, id: u32) -> Result<&Reservation> {
        self.data
            .reservations
            .iter()
            .find(|r| r.id == id)
            .ok_or(RestoranError::not_found(EntityKind::Reservation, id))
    }

    pub fn get_dish(&self, id: u32) -> Result<&Dish> {
        self.data
            .dishes
            .iter()
            .find(|d| d.id == id)
            .ok_or(RestoranError::not_found(EntityKind::Dish, id))
    }

    pub fn get_order(&self, id: u32) -> Result<&Order> {
        self.data
            .orders
            .iter()
            .find(|o| o.id == id)
            .ok_or(RestoranError::not_found(EntityKind::Order, id))
    }

    fn position(&self, kind: EntityKind, id: u32) -> Result<usize> {
        let found = match kind {
            EntityKind::Table => self.data.tables.iter().position(|t| t.id == id),
            EntityKind::Reservation => self.data.reservations.iter().position(|r| r.id == id),
            EntityKind::Dish => self.data.dishes.iter().position(|d| d.id == id),
            EntityKind::Order => self.data.orders.iter().position(|o| o.id == id),
        };
        found.ok_or(RestoranError::not_found(kind, id))
    }

    // ---------------------------------------------------------------------
    // Listings
    // ---------------------------------------------------------------------

    /// Tables by id.
    pub fn list_tables(&self) -> Vec<&Table> {
        let mut tables: Vec<&Table> = self.data.tables.iter().collect();
        tables.sort_by_key(|t| t.id);
        tables
    }

    /// Reservations by start time.
    pub fn list_reservations(&self) -> Vec<&Reservation> {
        let mut reservations: Vec<&Reservation> = self.data.reservations.iter().collect();
        reservations.sort_by_key(|r| (r.start, r.id));
        reservations
    }

    /// Dishes grouped by menu section, then by id.
    pub fn list_dishes(&self) -> Vec<&Dish> {
        let mut dishes: Vec<&Dish> = self.data.dishes.iter().collect();
        dishes.sort_by_key(|d| (d.category, d.id));
        dishes
    }

    /// Orders by id.
    pub fn list_orders(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.data.orders.iter().collect();
        orders.sort_by_key(|o| o.id);
        orders
    }

    /// Reservations whose client name contains `query` (ignoring case) or
    /// whose phone contains it verbatim.
    pub fn find_reservations(&self, query: &str) -> Vec<&Reservation> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.list_reservations()
            .into_iter()
            .filter(|r| r.client_name.to_lowercase().contains(&needle) || r.phone.contains(query))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Tables
    // ---------------------------------------------------------------------

    pub fn add_table(&mut self, new: NewTable) -> Result<Table> {
        let location = required_text("location", &new.location)?;
        validate_seats(new.seats)?;

        let table = Table {
            id: self.next_table_id(),
            location,
            seats: new.seats,
        };
        self.data.tables.push(table.clone());
        tracing::info!(table_id = table.id, "added table");
        self.persist()?;
        Ok(table)
    }

    /// Change a table's location or seat count. Refused while a reservation
    /// on the table is in effect.
    pub fn edit_table(&mut self, id: u32, update: TableUpdate, clock: &dyn Clock) -> Result<Table> {
        let idx = self.position(EntityKind::Table, id)?;

        let now = clock.now();
        if let Some(active) = self
            .data
            .reservations
            .iter()
            .find(|r| r.table_id == id && r.covers(now))
        {
            return Err(Conflict::TableOccupied {
                table_id: id,
                reservation_id: active.id,
            }
            .into());
        }

        let location = update
            .location
            .as_deref()
            .map(|l| required_text("location", l))
            .transpose()?;
        if let Some(seats) = update.seats {
            validate_seats(seats)?;
        }

        let table = &mut self.data.tables[idx];
        if let Some(location) = location {
            table.location = location;
        }
        if let Some(seats) = update.seats {
            table.seats = seats;
        }
        let table = table.clone();

        tracing::info!(table_id = id, "edited table");
        self.persist()?;
        Ok(table)
    }

    /// Remove a table that no reservation refers to, past or future.
    /// The table, if nothing still books it.
    pub fn check_table_removable(&self, id: u32) -> Result<&Table> {
        let table = self.get_table(id)?;
        let reservations = self
            .data
            .reservations
            .iter()
            .filter(|r| r.table_id == id)
            .count();
        if reservations > 0 {
            return Err(Conflict::TableReferenced {
                table_id: id,
                reservations,
            }
            .into());
        }
        Ok(table)
    }

    pub fn delete_table(&mut self, id: u32) -> Result<Table> {
        self.check_table_removable(id)?;
        let idx = self.position(EntityKind::Table, id)?;

        let table = self.data.tables.remove(idx);
        tracing::info!(table_id = id, "deleted table");
        self.persist()?;
        Ok(table)
    }

    // ---------------------------------------------------------------------
    // Reservations
    // ---------------------------------------------------------------------

    /// First reservation on `table_id`, other than `except`, that overlaps
    /// `[start, end)`.
    fn find_overlap(
        &self,
        table_id: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
        except: Option<u32>,
    ) -> Option<&Reservation> {
        self.data.reservations.iter().find(|r| {
            Some(r.id) != except && r.table_id == table_id && r.overlaps(start, end)
        })
    }

    fn check_free(
        &self,
        table_id: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
        except: Option<u32>,
    ) -> Result<()> {
        match self.find_overlap(table_id, start, end, except) {
            Some(other) => Err(Conflict::ReservationOverlap {
                table_id,
                reservation_id: other.id,
            }
            .into()),
            None => Ok(()),
        }
    }

    pub fn add_reservation(&mut self, new: NewReservation) -> Result<Reservation> {
        self.get_table(new.table_id)?;
        let client_name = required_text("client_name", &new.client_name)?;
        let phone = required_text("phone", &new.phone)?;
        validate_period(new.start, new.end)?;
        self.check_free(new.table_id, new.start, new.end, None)?;

        let reservation = Reservation {
            id: self.next_reservation_id(),
            client_id: new.client_id,
            client_name,
            phone,
            start: new.start,
            end: new.end,
            comment: normalize_comment(new.comment),
            table_id: new.table_id,
        };
        self.data.reservations.push(reservation.clone());
        tracing::info!(
            reservation_id = reservation.id,
            table_id = reservation.table_id,
            "added reservation"
        );
        self.persist()?;
        Ok(reservation)
    }

    /// Change a reservation. A new period is checked against every other
    /// reservation on the same table.
    pub fn edit_reservation(&mut self, id: u32, update: ReservationUpdate) -> Result<Reservation> {
        let idx = self.position(EntityKind::Reservation, id)?;
        let current = &self.data.reservations[idx];

        let start = update.start.unwrap_or(current.start);
        let end = update.end.unwrap_or(current.end);
        let client_name = update
            .client_name
            .as_deref()
            .map(|n| required_text("client_name", n))
            .transpose()?;
        let phone = update
            .phone
            .as_deref()
            .map(|p| required_text("phone", p))
            .transpose()?;
        validate_period(start, end)?;
        self.check_free(current.table_id, start, end, Some(id))?;

        let reservation = &mut self.data.reservations[idx];
        reservation.start = start;
        reservation.end = end;
        if let Some(name) = client_name {
            reservation.client_name = name;
        }
        if let Some(phone) = phone {
            reservation.phone = phone;
        }
        if let Some(comment) = update.comment {
            reservation.comment = normalize_comment(comment);
        }
        let reservation = reservation.clone();

        tracing::info!(reservation_id = id, "edited reservation");
        self.persist()?;
        Ok(reservation)
    }

    /// Push a reservation's end later. Only the added window
    /// `[current end, new_end)` is checked for overlaps.
    pub fn extend_reservation(&mut self, id: u32, new_end: NaiveDateTime) -> Result<Reservation> {
        let idx = self.position(EntityKind::Reservation, id)?;
        let current = &self.data.reservations[idx];

        if new_end <= current.end {
            return Err(RestoranError::validation(
                "end",
                format!(
                    "new end {} must be after the current end {}",
                    format_time(&new_end),
                    format_time(&current.end)
                ),
            ));
        }
        self.check_free(current.table_id, current.end, new_end, Some(id))?;

        let reservation = &mut self.data.reservations[idx];
        reservation.end = new_end;
        let reservation = reservation.clone();

        tracing::info!(reservation_id = id, end = %format_time(&new_end), "extended reservation");
        self.persist()?;
        Ok(reservation)
    }

    pub fn cancel_reservation(&mut self, id: u32) -> Result<Reservation> {
        let idx = self.position(EntityKind::Reservation, id)?;
        let reservation = self.data.reservations.remove(idx);
        tracing::info!(reservation_id = id, "cancelled reservation");
        self.persist()?;
        Ok(reservation)
    }

    // ---------------------------------------------------------------------
    // Dishes
    // ---------------------------------------------------------------------

    pub fn add_dish(&mut self, new: NewDish) -> Result<Dish> {
        let name = required_text("name", &new.name)?;
        validate_price(new.price)?;

        let dish = Dish {
            id: self.next_dish_id(),
            name,
            composition: new.composition,
            weight: new.weight,
            price: new.price,
            category: new.category,
            cook_time_minutes: new.cook_time_minutes,
        };
        self.data.dishes.push(dish.clone());
        tracing::info!(dish_id = dish.id, "added dish");
        self.persist()?;
        Ok(dish)
    }

    pub fn edit_dish(&mut self, id: u32, update: DishUpdate) -> Result<Dish> {
        let idx = self.position(EntityKind::Dish, id)?;

        let name = update
            .name
            .as_deref()
            .map(|n| required_text("name", n))
            .transpose()?;
        if let Some(price) = update.price {
            validate_price(price)?;
        }

        let dish = &mut self.data.dishes[idx];
        if let Some(name) = name {
            dish.name = name;
        }
        if let Some(composition) = update.composition {
            dish.composition = composition;
        }
        if let Some(weight) = update.weight {
            dish.weight = weight;
        }
        if let Some(price) = update.price {
            dish.price = price;
        }
        if let Some(category) = update.category {
            dish.category = category;
        }
        if let Some(minutes) = update.cook_time_minutes {
            dish.cook_time_minutes = minutes;
        }
        let dish = dish.clone();

        tracing::info!(dish_id = id, "edited dish");
        self.persist()?;
        Ok(dish)
    }

    /// Remove a dish that no order, open or closed, contains.
    /// The dish, if no order lists it.
    pub fn check_dish_removable(&self, id: u32) -> Result<&Dish> {
        let dish = self.get_dish(id)?;
        let orders = self
            .data
            .orders
            .iter()
            .filter(|o| o.references_dish(id))
            .count();
        if orders > 0 {
            return Err(Conflict::DishReferenced {
                dish_id: id,
                orders,
            }
            .into());
        }
        Ok(dish)
    }

    pub fn delete_dish(&mut self, id: u32) -> Result<Dish> {
        self.check_dish_removable(id)?;
        let idx = self.position(EntityKind::Dish, id)?;

        let dish = self.data.dishes.remove(idx);
        tracing::info!(dish_id = id, "deleted dish");
        self.persist()?;
        Ok(dish)
    }

    // ---------------------------------------------------------------------
    // Orders
    // ---------------------------------------------------------------------

    /// Open an order for a client seated at a table. The client must hold a
    /// reservation on that table in effect at `clock.now()`.
    pub fn create_order(&mut self, new: NewOrder, clock: &dyn Clock) -> Result<Order> {
        self.get_table(new.table_id)?;

        let now = clock.now();
        let seated = self
            .data
            .reservations
            .iter()
            .any(|r| r.client_id == new.client_id && r.table_id == new.table_id && r.covers(now));
        if !seated {
            return Err(Conflict::NoActiveReservation {
                client_id: new.client_id,
                table_id: new.table_id,
            }
            .into());
        }

        let order = Order {
            id: self.next_order_id(),
            client_id: new.client_id,
            table_id: new.table_id,
            items: Vec::new(),
            comment: new.comment,
            created_at: now,
            waiter_id: new.waiter_id,
            closed_at: None,
            total: Decimal::ZERO,
        };
        self.data.orders.push(order.clone());
        tracing::info!(order_id = order.id, table_id = order.table_id, "created order");
        self.persist()?;
        Ok(order)
    }

    pub fn add_order_item(&mut self, order_id: u32, dish_id: u32, quantity: u32) -> Result<Order> {
        let idx = self.position(EntityKind::Order, order_id)?;
        if self.data.orders[idx].is_closed() {
            return Err(Conflict::OrderClosed { order_id }.into());
        }
        validate_quantity(quantity)?;
        self.get_dish(dish_id)?;

        let order = &mut self.data.orders[idx];
        order.items.push(OrderItem { dish_id, quantity });
        let order = order.clone();

        tracing::info!(order_id, dish_id, quantity, "added order item");
        self.persist()?;
        Ok(order)
    }

    /// Finalize an order: compute its total from current menu prices and
    /// stamp the close time.
    pub fn close_order(&mut self, order_id: u32, clock: &dyn Clock) -> Result<Order> {
        let idx = self.position(EntityKind::Order, order_id)?;
        if self.data.orders[idx].is_closed() {
            return Err(Conflict::OrderClosed { order_id }.into());
        }

        let total = self.data.orders[idx]
            .compute_total(&self.data.dishes)
            .ok_or_else(|| RestoranError::validation("total", "order total is out of range"))?;
        let order = &mut self.data.orders[idx];
        order.total = total;
        order.closed_at = Some(clock.now());
        let order = order.clone();

        tracing::info!(order_id, total = %total, "closed order");
        self.persist()?;
        Ok(order)
    }

    pub fn delete_order(&mut self, id: u32) -> Result<Order> {
        let idx = self.position(EntityKind::Order, id)?;
        let order = self.data.orders.remove(idx);
        tracing::info!(order_id = id, "deleted order");
        self.persist()?;
        Ok(order)
    }

    // ---------------------------------------------------------------------
    // Bulk
    // ---------------------------------------------------------------------

    /// Empty every collection.
    pub fn clear_all(&mut self) -> Result<()> {
        self.data = RestaurantData::default();
        tracing::info!("cleared all data");
        self.persist()
    }

    /// Replace everything with the demo dataset, dated around `clock.now()`.
    pub fn init_defaults(&mut self, clock: &dyn Clock) -> Result<()> {
        self.data = seed::demo_data(clock.now());
        tracing::info!("loaded demo data");
        self.persist()
    }
}

fn required_text(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RestoranError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_seats(seats: u32) -> Result<()> {
    if seats == 0 {
        return Err(RestoranError::validation("seats", "must be greater than zero"));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(RestoranError::validation("price", "must be greater than zero"));
    }
    if price > MAX_PRICE {
        return Err(RestoranError::validation(
            "price",
            format!("must not exceed {}", MAX_PRICE),
        ));
    }
    Ok(())
}

fn validate_quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(RestoranError::validation(
            "quantity",
            "must be greater than zero",
        ));
    }
    if quantity > MAX_QUANTITY {
        return Err(RestoranError::validation(
            "quantity",
            format!("must not exceed {}", MAX_QUANTITY),
        ));
    }
    Ok(())
}

fn validate_period(start: NaiveDateTime, end: NaiveDateTime) -> Result<()> {
    if end <= start {
        return Err(RestoranError::validation(
            "end",
            format!(
                "{} must be after start {}",
                format_time(&end),
                format_time(&start)
            ),
        ));
    }
    Ok(())
}

fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment.filter(|c| !c.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{parse_time, VirtualClock};
    use tempfile::TempDir;

    fn at(s: &str) -> NaiveDateTime {
        parse_time(s).unwrap()
    }

    fn clock(s: &str) -> VirtualClock {
        VirtualClock::new(at(s))
    }

    fn new_table(location: &str, seats: u32) -> NewTable {
        NewTable {
            location: location.to_string(),
            seats,
        }
    }

    fn booking(table_id: u32, client_id: u32, start: &str, end: &str) -> NewReservation {
        NewReservation {
            table_id,
            client_id,
            client_name: format!("client {}", client_id),
            phone: format!("555-{:04}", client_id),
            start: at(start),
            end: at(end),
            comment: None,
        }
    }

    fn new_dish(name: &str, price: i64) -> NewDish {
        NewDish {
            name: name.to_string(),
            composition: String::new(),
            weight: "250".to_string(),
            price: Decimal::new(price, 0),
            category: DishCategory::MainCourses,
            cook_time_minutes: 15,
        }
    }

    fn new_order(client_id: u32, table_id: u32) -> NewOrder {
        NewOrder {
            client_id,
            table_id,
            waiter_id: 1,
            comment: String::new(),
        }
    }

    /// Table 1 with reservation A (client 101) from 12:00 to 14:00.
    fn lunch_service() -> RestaurantManager {
        let mut m = RestaurantManager::in_memory();
        m.add_table(new_table("window", 4)).unwrap();
        m.add_reservation(booking(1, 101, "2024-05-01 12:00", "2024-05-01 14:00"))
            .unwrap();
        m
    }

    fn assert_no_overlaps(m: &RestaurantManager) {
        let rs = m.reservations();
        for (i, a) in rs.iter().enumerate() {
            for b in &rs[i + 1..] {
                assert!(
                    a.table_id != b.table_id || !a.overlaps(b.start, b.end),
                    "reservations {} and {} overlap",
                    a.id,
                    b.id
                );
            }
        }
    }

    // --- ids -------------------------------------------------------------

    #[test]
    fn test_next_id_starts_at_one() {
        let m = RestaurantManager::in_memory();
        assert_eq!(m.next_table_id(), 1);
        assert_eq!(m.next_reservation_id(), 1);
        assert_eq!(m.next_dish_id(), 1);
        assert_eq!(m.next_order_id(), 1);
    }

    #[test]
    fn test_next_id_is_past_maximum_after_delete() {
        let mut m = RestaurantManager::in_memory();
        m.add_table(new_table("a", 2)).unwrap();
        m.add_table(new_table("b", 2)).unwrap();
        m.add_table(new_table("c", 2)).unwrap();
        m.delete_table(2).unwrap();
        assert_eq!(m.next_table_id(), 4);

        let t = m.add_table(new_table("d", 2)).unwrap();
        assert_eq!(t.id, 4);

        m.delete_table(4).unwrap();
        assert_eq!(m.next_table_id(), 4);
    }

    // --- tables ----------------------------------------------------------

    #[test]
    fn test_add_table_validates_input() {
        let mut m = RestaurantManager::in_memory();
        let err = m.add_table(new_table("  ", 4)).unwrap_err();
        assert!(err.is_validation());
        let err = m.add_table(new_table("window", 0)).unwrap_err();
        assert!(err.is_validation());
        assert!(m.tables().is_empty());

        let t = m.add_table(new_table("  window ", 4)).unwrap();
        assert_eq!(t.location, "window");
    }

    #[test]
    fn test_edit_table_refused_while_occupied() {
        let mut m = lunch_service();
        let update = TableUpdate {
            seats: Some(6),
            ..Default::default()
        };

        let err = m
            .edit_table(1, update.clone(), &clock("2024-05-01 12:00"))
            .unwrap_err();
        assert_eq!(
            err.conflict(),
            Some(&Conflict::TableOccupied {
                table_id: 1,
                reservation_id: 1
            })
        );
        assert_eq!(m.get_table(1).unwrap().seats, 4);

        // The reservation no longer covers its own end instant.
        let t = m.edit_table(1, update, &clock("2024-05-01 14:00")).unwrap();
        assert_eq!(t.seats, 6);
    }

    #[test]
    fn test_edit_missing_table_is_not_found() {
        let mut m = RestaurantManager::in_memory();
        let err = m
            .edit_table(9, TableUpdate::default(), &clock("2024-05-01 12:00"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_table_refused_while_referenced() {
        let mut m = lunch_service();
        m.add_table(new_table("aisle", 2)).unwrap();

        let err = m.delete_table(1).unwrap_err();
        assert_eq!(
            err.conflict(),
            Some(&Conflict::TableReferenced {
                table_id: 1,
                reservations: 1
            })
        );
        assert_eq!(m.tables().len(), 2);

        let removed = m.delete_table(2).unwrap();
        assert_eq!(removed.location, "aisle");

        m.cancel_reservation(1).unwrap();
        m.delete_table(1).unwrap();
        assert!(m.tables().is_empty());
    }

    #[test]
    fn test_removable_checks_run_without_mutating() {
        let mut m = lunch_service();
        m.add_dish(new_dish("Soup", 280)).unwrap();
        let o = m
            .create_order(new_order(101, 1), &clock("2024-05-01 12:30"))
            .unwrap();
        m.add_order_item(o.id, 1, 1).unwrap();

        assert!(m.check_table_removable(1).unwrap_err().is_conflict());
        assert!(m.check_table_removable(5).unwrap_err().is_not_found());
        assert!(m.check_dish_removable(1).unwrap_err().is_conflict());
        assert_eq!(m.tables().len(), 1);
        assert_eq!(m.dishes().len(), 1);

        m.add_table(new_table("aisle", 2)).unwrap();
        assert_eq!(m.check_table_removable(2).unwrap().location, "aisle");
    }

    // --- reservations ----------------------------------------------------

    #[test]
    fn test_overlap_scenario() {
        let mut m = lunch_service();

        let err = m
            .add_reservation(booking(1, 102, "2024-05-01 13:00", "2024-05-01 15:00"))
            .unwrap_err();
        assert_eq!(
            err.conflict(),
            Some(&Conflict::ReservationOverlap {
                table_id: 1,
                reservation_id: 1
            })
        );

        let c = m
            .add_reservation(booking(1, 103, "2024-05-01 14:00", "2024-05-01 15:00"))
            .unwrap();
        assert_eq!(c.id, 2);
        assert_no_overlaps(&m);
    }

    #[test]
    fn test_same_period_on_other_table_is_fine() {
        let mut m = lunch_service();
        m.add_table(new_table("aisle", 2)).unwrap();
        m.add_reservation(booking(2, 102, "2024-05-01 12:00", "2024-05-01 14:00"))
            .unwrap();
        assert_eq!(m.reservations().len(), 2);
    }

    #[test]
    fn test_add_reservation_requires_table_and_period() {
        let mut m = RestaurantManager::in_memory();
        let err = m
            .add_reservation(booking(1, 101, "2024-05-01 12:00", "2024-05-01 14:00"))
            .unwrap_err();
        assert!(matches!(
            err,
            RestoranError::NotFound {
                kind: EntityKind::Table,
                id: 1
            }
        ));

        m.add_table(new_table("window", 4)).unwrap();
        let err = m
            .add_reservation(booking(1, 101, "2024-05-01 14:00", "2024-05-01 14:00"))
            .unwrap_err();
        assert!(err.is_validation());
        let err = m
            .add_reservation(booking(1, 101, "2024-05-01 14:00", "2024-05-01 12:00"))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(m.reservations().is_empty());
    }

    #[test]
    fn test_reservation_requires_name_and_phone() {
        let mut m = RestaurantManager::in_memory();
        m.add_table(new_table("window", 4)).unwrap();

        let mut new = booking(1, 101, "2024-05-01 12:00", "2024-05-01 14:00");
        new.client_name = "   ".to_string();
        let err = m.add_reservation(new).unwrap_err();
        assert!(matches!(err, RestoranError::Validation { field: "client_name", .. }));

        let mut new = booking(1, 101, "2024-05-01 12:00", "2024-05-01 14:00");
        new.phone = String::new();
        let err = m.add_reservation(new).unwrap_err();
        assert!(matches!(err, RestoranError::Validation { field: "phone", .. }));
        assert!(m.reservations().is_empty());

        let mut new = booking(1, 101, "2024-05-01 12:00", "2024-05-01 14:00");
        new.client_name = "  Max ".to_string();
        let r = m.add_reservation(new).unwrap();
        assert_eq!(r.client_name, "Max");

        let blank_phone = ReservationUpdate {
            phone: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(m.edit_reservation(r.id, blank_phone).unwrap_err().is_validation());
        let blank_name = ReservationUpdate {
            client_name: Some(String::new()),
            ..Default::default()
        };
        assert!(m.edit_reservation(r.id, blank_name).unwrap_err().is_validation());

        let stored = m.get_reservation(r.id).unwrap();
        assert_eq!(stored.client_name, "Max");
        assert_eq!(stored.phone, "555-0101");
    }

    #[test]
    fn test_blank_comment_is_stored_as_none() {
        let mut m = RestaurantManager::in_memory();
        m.add_table(new_table("window", 4)).unwrap();
        let mut new = booking(1, 101, "2024-05-01 12:00", "2024-05-01 14:00");
        new.comment = Some("   ".to_string());
        let r = m.add_reservation(new).unwrap();
        assert!(r.comment.is_none());
    }

    #[test]
    fn test_edit_reservation_excludes_itself() {
        let mut m = lunch_service();
        let update = ReservationUpdate {
            start: Some(at("2024-05-01 13:00")),
            end: Some(at("2024-05-01 15:00")),
            comment: Some(Some("moved".to_string())),
            ..Default::default()
        };
        let r = m.edit_reservation(1, update).unwrap();
        assert_eq!(r.start, at("2024-05-01 13:00"));
        assert_eq!(r.end, at("2024-05-01 15:00"));
        assert_eq!(r.comment.as_deref(), Some("moved"));
    }

    #[test]
    fn test_edit_reservation_rejects_overlap_with_other() {
        let mut m = lunch_service();
        m.add_reservation(booking(1, 102, "2024-05-01 15:00", "2024-05-01 17:00"))
            .unwrap();

        let update = ReservationUpdate {
            end: Some(at("2024-05-01 15:30")),
            ..Default::default()
        };
        let err = m.edit_reservation(1, update).unwrap_err();
        assert_eq!(
            err.conflict(),
            Some(&Conflict::ReservationOverlap {
                table_id: 1,
                reservation_id: 2
            })
        );
        assert_eq!(m.get_reservation(1).unwrap().end, at("2024-05-01 14:00"));
        assert_no_overlaps(&m);
    }

    #[test]
    fn test_edit_reservation_rejects_inverted_period() {
        let mut m = lunch_service();
        let update = ReservationUpdate {
            start: Some(at("2024-05-01 15:00")),
            ..Default::default()
        };
        let err = m.edit_reservation(1, update).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_extend_reservation_rules() {
        let mut m = lunch_service();
        m.add_reservation(booking(1, 103, "2024-05-01 14:00", "2024-05-01 15:00"))
            .unwrap();

        let err = m.extend_reservation(1, at("2024-05-01 16:00")).unwrap_err();
        assert!(err.is_conflict());

        let err = m.extend_reservation(1, at("2024-05-01 14:00")).unwrap_err();
        assert!(err.is_validation());

        let err = m.extend_reservation(1, at("2024-05-01 13:00")).unwrap_err();
        assert!(err.is_validation());

        assert_eq!(m.get_reservation(1).unwrap().end, at("2024-05-01 14:00"));

        let r = m.extend_reservation(2, at("2024-05-01 16:30")).unwrap();
        assert_eq!(r.end, at("2024-05-01 16:30"));
        assert_no_overlaps(&m);
    }

    #[test]
    fn test_extend_only_checks_added_window() {
        // Stored data may already contain an overlap inside the existing
        // period (e.g. edited by hand); extending only looks at the new part.
        let mut m = RestaurantManager::with_data(RestaurantData {
            tables: vec![Table {
                id: 1,
                location: "window".to_string(),
                seats: 4,
            }],
            reservations: vec![
                Reservation {
                    id: 1,
                    client_id: 101,
                    client_name: "A".to_string(),
                    phone: String::new(),
                    start: at("2024-05-01 12:00"),
                    end: at("2024-05-01 14:00"),
                    comment: None,
                    table_id: 1,
                },
                Reservation {
                    id: 2,
                    client_id: 102,
                    client_name: "B".to_string(),
                    phone: String::new(),
                    start: at("2024-05-01 12:30"),
                    end: at("2024-05-01 13:00"),
                    comment: None,
                    table_id: 1,
                },
            ],
            ..Default::default()
        });

        let r = m.extend_reservation(1, at("2024-05-01 15:00")).unwrap();
        assert_eq!(r.end, at("2024-05-01 15:00"));
    }

    #[test]
    fn test_cancel_reservation() {
        let mut m = lunch_service();
        let r = m.cancel_reservation(1).unwrap();
        assert_eq!(r.client_id, 101);
        assert!(m.reservations().is_empty());
        assert!(m.cancel_reservation(1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_find_reservations() {
        let mut m = lunch_service();
        let mut anna = booking(1, 102, "2024-05-01 16:00", "2024-05-01 17:00");
        anna.client_name = "Anna".to_string();
        anna.phone = "5745552377".to_string();
        m.add_reservation(anna).unwrap();

        let found = m.find_reservations("anna");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].client_id, 102);

        assert_eq!(m.find_reservations("5552377").len(), 1);
        assert_eq!(m.find_reservations("client").len(), 1);
        assert!(m.find_reservations("  ").is_empty());
    }

    // --- dishes ----------------------------------------------------------

    #[test]
    fn test_add_dish_validates_input() {
        let mut m = RestaurantManager::in_memory();
        assert!(m.add_dish(new_dish("", 100)).unwrap_err().is_validation());
        assert!(m.add_dish(new_dish("Soup", 0)).unwrap_err().is_validation());
        assert!(m.add_dish(new_dish("Soup", -5)).unwrap_err().is_validation());
        assert!(m.dishes().is_empty());

        let mut too_expensive = new_dish("Caviar", 0);
        too_expensive.price = MAX_PRICE + Decimal::ONE;
        assert!(m.add_dish(too_expensive).unwrap_err().is_validation());
        assert!(m.dishes().is_empty());

        let d = m.add_dish(new_dish("Soup", 280)).unwrap();
        assert_eq!(d.id, 1);
    }

    #[test]
    fn test_edit_dish_with_unknown_category_falls_back() {
        let mut m = RestaurantManager::in_memory();
        m.add_dish(new_dish("Soup", 280)).unwrap();

        let update = DishUpdate {
            price: Some(Decimal::new(300, 0)),
            category: Some(DishCategory::from_input("chef's special")),
            ..Default::default()
        };
        let d = m.edit_dish(1, update).unwrap();
        assert_eq!(d.category, DishCategory::Other);
        assert_eq!(d.price, Decimal::new(300, 0));

        let bad = DishUpdate {
            price: Some(Decimal::ZERO),
            name: Some("Broth".to_string()),
            ..Default::default()
        };
        assert!(m.edit_dish(1, bad).unwrap_err().is_validation());
        assert_eq!(m.get_dish(1).unwrap().name, "Soup");
    }

    #[test]
    fn test_delete_dish_refused_while_ordered() {
        let mut m = lunch_service();
        m.add_dish(new_dish("Soup", 280)).unwrap();
        m.add_dish(new_dish("Salad", 420)).unwrap();
        let noon = clock("2024-05-01 12:30");
        let o = m.create_order(new_order(101, 1), &noon).unwrap();
        m.add_order_item(o.id, 1, 2).unwrap();
        m.close_order(o.id, &noon).unwrap();

        let err = m.delete_dish(1).unwrap_err();
        assert_eq!(
            err.conflict(),
            Some(&Conflict::DishReferenced {
                dish_id: 1,
                orders: 1
            })
        );

        m.delete_dish(2).unwrap();
        assert_eq!(m.dishes().len(), 1);
    }

    // --- orders ----------------------------------------------------------

    #[test]
    fn test_create_order_requires_active_reservation() {
        let mut m = lunch_service();

        let err = m
            .create_order(new_order(101, 1), &clock("2024-05-01 11:59"))
            .unwrap_err();
        assert!(err.is_conflict());

        let err = m
            .create_order(new_order(101, 1), &clock("2024-05-01 14:00"))
            .unwrap_err();
        assert!(err.is_conflict());

        let err = m
            .create_order(new_order(999, 1), &clock("2024-05-01 12:30"))
            .unwrap_err();
        assert_eq!(
            err.conflict(),
            Some(&Conflict::NoActiveReservation {
                client_id: 999,
                table_id: 1
            })
        );

        let err = m
            .create_order(new_order(101, 7), &clock("2024-05-01 12:30"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(m.orders().is_empty());

        let o = m
            .create_order(new_order(101, 1), &clock("2024-05-01 12:00"))
            .unwrap();
        assert_eq!(o.id, 1);
        assert_eq!(o.created_at, at("2024-05-01 12:00"));
        assert!(o.items.is_empty());
        assert!(!o.is_closed());
    }

    #[test]
    fn test_add_order_item_rules() {
        let mut m = lunch_service();
        m.add_dish(new_dish("Soup", 280)).unwrap();
        let noon = clock("2024-05-01 12:30");
        let o = m.create_order(new_order(101, 1), &noon).unwrap();

        assert!(m.add_order_item(o.id, 1, 0).unwrap_err().is_validation());
        assert!(m
            .add_order_item(o.id, 1, MAX_QUANTITY + 1)
            .unwrap_err()
            .is_validation());
        assert!(m.add_order_item(o.id, 42, 1).unwrap_err().is_not_found());
        assert!(m.add_order_item(77, 1, 1).unwrap_err().is_not_found());

        let o = m.add_order_item(o.id, 1, 2).unwrap();
        assert_eq!(o.items, vec![OrderItem { dish_id: 1, quantity: 2 }]);

        m.close_order(o.id, &noon).unwrap();
        let err = m.add_order_item(o.id, 1, 1).unwrap_err();
        assert_eq!(err.conflict(), Some(&Conflict::OrderClosed { order_id: 1 }));
        assert_eq!(m.get_order(1).unwrap().items.len(), 1);
    }

    #[test]
    fn test_close_order_computes_total() {
        let mut m = lunch_service();
        m.add_dish(new_dish("Steak", 100)).unwrap();
        let c = clock("2024-05-01 12:30");
        let o = m.create_order(new_order(101, 1), &c).unwrap();
        m.add_order_item(o.id, 1, 3).unwrap();

        c.set(at("2024-05-01 13:45"));
        let closed = m.close_order(o.id, &c).unwrap();
        assert_eq!(closed.total, Decimal::new(30000, 2));
        assert_eq!(closed.closed_at, Some(at("2024-05-01 13:45")));
    }

    #[test]
    fn test_close_order_with_deleted_dish_counts_zero() {
        // An order line can outlive its dish when the data was edited by
        // hand; closing must not fail on it.
        let mut m = lunch_service();
        let c = clock("2024-05-01 12:30");
        m.add_dish(new_dish("Steak", 100)).unwrap();
        let o = m.create_order(new_order(101, 1), &c).unwrap();
        m.add_order_item(o.id, 1, 3).unwrap();
        m.data.dishes.clear();

        let closed = m.close_order(o.id, &c).unwrap();
        assert_eq!(closed.total, Decimal::ZERO);
        assert!(closed.is_closed());
    }

    #[test]
    fn test_close_order_with_largest_lines_stays_in_range() {
        let mut m = lunch_service();
        let mut dish = new_dish("Banquet", 0);
        dish.price = MAX_PRICE;
        m.add_dish(dish).unwrap();
        let c = clock("2024-05-01 12:30");
        let o = m.create_order(new_order(101, 1), &c).unwrap();
        for _ in 0..3 {
            m.add_order_item(o.id, 1, MAX_QUANTITY).unwrap();
        }

        let closed = m.close_order(o.id, &c).unwrap();
        assert_eq!(closed.total, MAX_PRICE * Decimal::from(3 * MAX_QUANTITY));
    }

    #[test]
    fn test_close_order_overflow_is_validation_error() {
        // Prices edited by hand can exceed what the manager accepts.
        let mut m = lunch_service();
        m.add_dish(new_dish("Steak", 100)).unwrap();
        let c = clock("2024-05-01 12:30");
        let o = m.create_order(new_order(101, 1), &c).unwrap();
        m.add_order_item(o.id, 1, 1000).unwrap();
        m.data.dishes[0].price = Decimal::from_i128_with_scale(10i128.pow(26), 0);

        let err = m.close_order(o.id, &c).unwrap_err();
        assert!(err.is_validation());
        let stored = m.get_order(o.id).unwrap();
        assert!(!stored.is_closed());
        assert_eq!(stored.total, Decimal::ZERO);
    }

    #[test]
    fn test_close_twice_keeps_first_result() {
        let mut m = lunch_service();
        m.add_dish(new_dish("Steak", 100)).unwrap();
        let c = clock("2024-05-01 12:30");
        let o = m.create_order(new_order(101, 1), &c).unwrap();
        m.add_order_item(o.id, 1, 1).unwrap();
        let first = m.close_order(o.id, &c).unwrap();

        m.edit_dish(
            1,
            DishUpdate {
                price: Some(Decimal::new(999, 0)),
                ..Default::default()
            },
        )
        .unwrap();
        c.set(at("2024-05-01 13:30"));

        let err = m.close_order(o.id, &c).unwrap_err();
        assert!(err.is_conflict());
        let stored = m.get_order(o.id).unwrap();
        assert_eq!(stored.total, first.total);
        assert_eq!(stored.closed_at, first.closed_at);
    }

    #[test]
    fn test_delete_order() {
        let mut m = lunch_service();
        let o = m
            .create_order(new_order(101, 1), &clock("2024-05-01 12:30"))
            .unwrap();
        m.delete_order(o.id).unwrap();
        assert!(m.orders().is_empty());
        assert!(m.delete_order(o.id).unwrap_err().is_not_found());
    }

    // --- listings --------------------------------------------------------

    #[test]
    fn test_listings_are_sorted() {
        let mut m = RestaurantManager::in_memory();
        m.add_table(new_table("a", 2)).unwrap();
        m.add_reservation(booking(1, 1, "2024-05-02 12:00", "2024-05-02 13:00"))
            .unwrap();
        m.add_reservation(booking(1, 2, "2024-05-01 12:00", "2024-05-01 13:00"))
            .unwrap();
        let starts: Vec<u32> = m.list_reservations().iter().map(|r| r.id).collect();
        assert_eq!(starts, vec![2, 1]);

        let mut dessert = new_dish("Cake", 300);
        dessert.category = DishCategory::Dessert;
        m.add_dish(dessert).unwrap();
        let mut drink = new_dish("Tea", 50);
        drink.category = DishCategory::Drinks;
        m.add_dish(drink).unwrap();
        let names: Vec<&str> = m.list_dishes().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Tea", "Cake"]);
    }

    // --- bulk and persistence ---------------------------------------------

    #[test]
    fn test_init_defaults_and_clear() {
        let mut m = RestaurantManager::in_memory();
        m.init_defaults(&clock("2024-05-01 10:00")).unwrap();
        assert_eq!(m.tables().len(), 4);
        assert_eq!(m.dishes().len(), 4);
        assert_no_overlaps(&m);

        m.clear_all().unwrap();
        assert!(m.data().is_empty());
    }

    #[test]
    fn test_mutations_write_through() {
        let tmp = TempDir::new().unwrap();
        let (mut m, warnings) = RestaurantManager::open(JsonStore::new(tmp.path().join("data")));
        assert!(warnings.is_empty());

        m.add_table(new_table("window", 4)).unwrap();
        m.add_dish(new_dish("Soup", 280)).unwrap();

        let (reopened, _) = RestaurantManager::open(JsonStore::new(tmp.path().join("data")));
        assert_eq!(reopened.data(), m.data());
    }

    #[test]
    fn test_prices_reload_with_full_precision() {
        let tmp = TempDir::new().unwrap();
        let (mut m, _) = RestaurantManager::open(JsonStore::new(tmp.path()));
        let mut dish = new_dish("Soup", 0);
        dish.price = "12.345678901234567891".parse().unwrap();
        m.add_dish(dish.clone()).unwrap();

        let mut top = new_dish("Banquet", 0);
        top.price = MAX_PRICE;
        m.add_dish(top).unwrap();

        let (reopened, warnings) = RestaurantManager::open(JsonStore::new(tmp.path()));
        assert!(warnings.is_empty());
        assert_eq!(reopened.get_dish(1).unwrap().price, dish.price);
        assert_eq!(reopened.get_dish(2).unwrap().price, MAX_PRICE);
    }

    #[test]
    fn test_failed_validation_does_not_write() {
        let tmp = TempDir::new().unwrap();
        let (mut m, _) = RestaurantManager::open(JsonStore::new(tmp.path()));
        assert!(m.add_table(new_table("", 4)).is_err());
        assert!(!tmp.path().join(crate::storage::TABLES_FILE).exists());
    }

    #[test]
    fn test_relocate_copies_and_reloads() {
        let tmp = TempDir::new().unwrap();
        let old_dir = tmp.path().join("old");
        let new_dir = tmp.path().join("new");
        let (mut m, _) = RestaurantManager::open(JsonStore::new(&old_dir));
        m.add_table(new_table("window", 4)).unwrap();

        let warnings = m.relocate(new_dir.clone(), true);
        assert!(warnings.is_empty());
        assert_eq!(m.data_dir(), Some(new_dir.as_path()));
        assert_eq!(m.tables().len(), 1);

        let empty_dir = tmp.path().join("empty");
        m.relocate(empty_dir, false);
        assert!(m.tables().is_empty());
    }
}

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::clock::{format_time, Clock, VirtualClock};
use crate::config::Config;
use crate::entity::DishCategory;
use crate::error::{RestoranError, Result};
use crate::manager::{
    DishUpdate, NewDish, NewOrder, NewReservation, NewTable, RestaurantManager, ReservationUpdate,
    TableUpdate,
};
use crate::stats;
use crate::storage::JsonStore;
use crate::warnings::{self, Warning};

/// Global options every handler needs.
#[derive(Debug, Clone)]
pub struct Context {
    pub config_path: PathBuf,
    pub at: Option<NaiveDateTime>,
}

/// An opened data directory with its clock.
struct Session {
    config: Config,
    manager: RestaurantManager,
    clock: VirtualClock,
}

impl Context {
    pub fn new(config_path: PathBuf, at: Option<NaiveDateTime>) -> Self {
        Self { config_path, at }
    }

    fn load_config(&self) -> Config {
        let (config, warning) = Config::load(&self.config_path);
        if let Some(w) = warning {
            warnings::report(&[w]);
        }
        config
    }

    fn open(&self) -> Session {
        let config = self.load_config();
        let (manager, load_warnings) = RestaurantManager::open(JsonStore::new(config.data_dir()));
        warnings::report(&load_warnings);
        let clock = config.clock(self.at);
        Session {
            config,
            manager,
            clock,
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Ask before a destructive action. Without a terminal, `--force` is required.
fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    eprintln!("{} [y/N] ", prompt);

    if atty::is(atty::Stream::Stdin) {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(false);
        }
        Ok(true)
    } else {
        Err(RestoranError::InvalidInput(
            "Use --force to confirm in non-interactive mode".to_string(),
        ))
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

// -------------------------------------------------------------------------
// Setup
// -------------------------------------------------------------------------

pub fn handle_init(ctx: &Context, seed: bool) -> Result<()> {
    let config = ctx.load_config();
    let dir = config.data_dir();

    let store = JsonStore::new(&dir);
    store.ensure_dir()?;
    if !ctx.config_path.exists() {
        Config {
            data_path: Some(dir.clone()),
            ..config.clone()
        }
        .save(&ctx.config_path)?;
    }

    let (mut manager, load_warnings) = RestaurantManager::open(store);
    warnings::report(&load_warnings);
    if seed {
        manager.init_defaults(&config.clock(ctx.at))?;
    } else {
        manager.save_all()?;
    }

    println!("Initialized restoran data in {}", dir.display());
    if seed {
        println!("  (demo data loaded)");
    }
    Ok(())
}

pub fn handle_seed(ctx: &Context, force: bool) -> Result<()> {
    let mut session = ctx.open();
    if !confirm("Replace ALL data with the demo dataset?", force)? {
        return Ok(());
    }
    session.manager.init_defaults(&session.clock)?;
    println!(
        "Loaded demo data: {} tables, {} reservations, {} dishes, {} orders",
        session.manager.tables().len(),
        session.manager.reservations().len(),
        session.manager.dishes().len(),
        session.manager.orders().len()
    );
    Ok(())
}

// -------------------------------------------------------------------------
// Tables
// -------------------------------------------------------------------------

pub fn handle_table_add(ctx: &Context, location: String, seats: u32, json: bool) -> Result<()> {
    let mut session = ctx.open();
    let table = session.manager.add_table(NewTable { location, seats })?;

    if json {
        print_json(&table)?;
    } else {
        println!("Created table {}", table);
    }
    Ok(())
}

pub fn handle_table_edit(
    ctx: &Context,
    id: u32,
    location: Option<String>,
    seats: Option<u32>,
    json: bool,
) -> Result<()> {
    let mut session = ctx.open();
    let table = session
        .manager
        .edit_table(id, TableUpdate { location, seats }, &session.clock)?;

    if json {
        print_json(&table)?;
    } else {
        println!("Updated table {}", table);
    }
    Ok(())
}

pub fn handle_table_delete(ctx: &Context, id: u32, force: bool) -> Result<()> {
    let mut session = ctx.open();
    let table = session.manager.check_table_removable(id)?;
    if !confirm(&format!("Delete table {} ({})?", table.id, table.location), force)? {
        return Ok(());
    }
    let table = session.manager.delete_table(id)?;
    println!("Deleted table {}", table);
    Ok(())
}

pub fn handle_table_list(ctx: &Context, json: bool) -> Result<()> {
    let session = ctx.open();
    let tables = session.manager.list_tables();

    if json {
        print_json(&tables)?;
    } else if tables.is_empty() {
        println!("No tables found.");
    } else {
        println!("Tables:\n");
        for t in tables {
            println!("  {}", t);
        }
    }
    Ok(())
}

pub fn handle_table_info(ctx: &Context, id: u32, json: bool) -> Result<()> {
    let session = ctx.open();
    let schedule = stats::table_schedule(
        session.manager.tables(),
        session.manager.reservations(),
        id,
        &session.clock,
    )?;

    if json {
        return print_json(&schedule);
    }

    println!("ID: {}", schedule.table.id);
    println!("Location: {}", schedule.table.location);
    println!("Seats: {}", schedule.table.seats);
    println!("Reservations:");
    if schedule.entries.is_empty() {
        println!("  none");
    }
    for entry in &schedule.entries {
        let r = &entry.reservation;
        println!(
            "  {} - {}{} | reservation {} | client {} | {} | phone: {} | comment: {}",
            format_time(&r.start),
            format_time(&r.end),
            if entry.active { " (OCCUPIED NOW)" } else { "" },
            r.id,
            r.client_id,
            r.client_name,
            r.phone,
            r.comment_text()
        );
    }
    Ok(())
}

// -------------------------------------------------------------------------
// Reservations
// -------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
pub fn handle_reservation_add(
    ctx: &Context,
    table_id: u32,
    client_id: u32,
    client_name: String,
    phone: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    comment: Option<String>,
    json: bool,
) -> Result<()> {
    let mut session = ctx.open();
    let reservation = session.manager.add_reservation(NewReservation {
        table_id,
        client_id,
        client_name,
        phone,
        start,
        end,
        comment,
    })?;

    if json {
        print_json(&reservation)?;
    } else {
        println!("Created reservation {}", reservation);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_reservation_edit(
    ctx: &Context,
    id: u32,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    client_name: Option<String>,
    phone: Option<String>,
    comment: Option<String>,
    clear_comment: bool,
    json: bool,
) -> Result<()> {
    let mut session = ctx.open();
    let comment = if clear_comment {
        Some(None)
    } else {
        comment.map(Some)
    };
    let reservation = session.manager.edit_reservation(
        id,
        ReservationUpdate {
            start,
            end,
            client_name,
            phone,
            comment,
        },
    )?;

    if json {
        print_json(&reservation)?;
    } else {
        println!("Updated reservation {}", reservation);
    }
    Ok(())
}

pub fn handle_reservation_extend(
    ctx: &Context,
    id: u32,
    end: NaiveDateTime,
    json: bool,
) -> Result<()> {
    let mut session = ctx.open();
    let reservation = session.manager.extend_reservation(id, end)?;

    if json {
        print_json(&reservation)?;
    } else {
        println!(
            "Extended reservation {} until {}",
            reservation.id,
            format_time(&reservation.end)
        );
    }
    Ok(())
}

pub fn handle_reservation_cancel(ctx: &Context, id: u32, force: bool) -> Result<()> {
    let mut session = ctx.open();
    let reservation = session.manager.get_reservation(id)?;
    if !confirm(
        &format!(
            "Cancel reservation {} ({}, {})?",
            reservation.id,
            reservation.client_name,
            format_time(&reservation.start)
        ),
        force,
    )? {
        return Ok(());
    }
    let reservation = session.manager.cancel_reservation(id)?;
    println!("Cancelled reservation {}", reservation.id);
    Ok(())
}

pub fn handle_reservation_list(ctx: &Context, json: bool) -> Result<()> {
    let session = ctx.open();
    let reservations = session.manager.list_reservations();

    if json {
        print_json(&reservations)?;
    } else if reservations.is_empty() {
        println!("No reservations found.");
    } else {
        println!("Reservations:\n");
        for r in reservations {
            let marker = if r.covers(session.clock.now()) { "*" } else { " " };
            println!(" {} {}", marker, r);
        }
    }
    Ok(())
}

pub fn handle_reservation_find(ctx: &Context, query: String, json: bool) -> Result<()> {
    let session = ctx.open();
    let results = session.manager.find_reservations(&query);

    if json {
        print_json(&results)?;
    } else if results.is_empty() {
        println!("No reservations found for '{}'.", query);
    } else {
        println!("Reservations matching '{}':\n", query);
        for r in results {
            println!("  {}", r);
        }
    }
    Ok(())
}

// -------------------------------------------------------------------------
// Dishes
// -------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
pub fn handle_dish_add(
    ctx: &Context,
    name: String,
    price: Decimal,
    category: String,
    composition: String,
    weight: String,
    cook_time_minutes: u32,
    json: bool,
) -> Result<()> {
    let mut session = ctx.open();
    let dish = session.manager.add_dish(NewDish {
        name,
        composition,
        weight,
        price,
        category: DishCategory::from_input(&category),
        cook_time_minutes,
    })?;

    if json {
        print_json(&dish)?;
    } else {
        println!("Created dish {}", dish);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_dish_edit(
    ctx: &Context,
    id: u32,
    name: Option<String>,
    price: Option<Decimal>,
    category: Option<String>,
    composition: Option<String>,
    weight: Option<String>,
    cook_time_minutes: Option<u32>,
    json: bool,
) -> Result<()> {
    let mut session = ctx.open();
    let dish = session.manager.edit_dish(
        id,
        DishUpdate {
            name,
            composition,
            weight,
            price,
            category: category.as_deref().map(DishCategory::from_input),
            cook_time_minutes,
        },
    )?;

    if json {
        print_json(&dish)?;
    } else {
        println!("Updated dish {}", dish);
    }
    Ok(())
}

pub fn handle_dish_delete(ctx: &Context, id: u32, force: bool) -> Result<()> {
    let mut session = ctx.open();
    let dish = session.manager.check_dish_removable(id)?;
    if !confirm(&format!("Delete dish {} ({})?", dish.id, dish.name), force)? {
        return Ok(());
    }
    let dish = session.manager.delete_dish(id)?;
    println!("Deleted dish {}", dish);
    Ok(())
}

pub fn handle_dish_list(ctx: &Context, json: bool) -> Result<()> {
    let session = ctx.open();
    let dishes = session.manager.list_dishes();

    if json {
        print_json(&dishes)?;
    } else if dishes.is_empty() {
        println!("No dishes found.");
    } else {
        println!("Menu:");
        let mut section = None;
        for d in dishes {
            if section != Some(d.category) {
                println!("\n  {}", d.category);
                section = Some(d.category);
            }
            println!(
                "    {:3} {} - {} ({} min) [{}] {}",
                d.id,
                d.name,
                money(d.price),
                d.cook_time_minutes,
                d.weight,
                d.composition
            );
        }
    }
    Ok(())
}

// -------------------------------------------------------------------------
// Orders
// -------------------------------------------------------------------------

pub fn handle_order_create(
    ctx: &Context,
    client_id: u32,
    table_id: u32,
    waiter_id: u32,
    comment: String,
    json: bool,
) -> Result<()> {
    let mut session = ctx.open();
    let order = session.manager.create_order(
        NewOrder {
            client_id,
            table_id,
            waiter_id,
            comment,
        },
        &session.clock,
    )?;

    if json {
        print_json(&order)?;
    } else {
        println!("Created order {}", order);
    }
    Ok(())
}

pub fn handle_order_add_item(
    ctx: &Context,
    order_id: u32,
    dish_id: u32,
    quantity: u32,
    json: bool,
) -> Result<()> {
    let mut session = ctx.open();
    let order = session.manager.add_order_item(order_id, dish_id, quantity)?;

    if json {
        print_json(&order)?;
    } else {
        let dish = session.manager.get_dish(dish_id)?;
        println!(
            "Added {} x {} to order {} ({} item(s) total)",
            quantity,
            dish.name,
            order.id,
            order.item_count()
        );
    }
    Ok(())
}

pub fn handle_order_close(ctx: &Context, id: u32, json: bool) -> Result<()> {
    let mut session = ctx.open();
    let order = session.manager.close_order(id, &session.clock)?;

    if json {
        print_json(&order)?;
    } else {
        println!("Closed order {} | total: {}", order.id, money(order.total));
    }
    Ok(())
}

pub fn handle_order_delete(ctx: &Context, id: u32, force: bool) -> Result<()> {
    let mut session = ctx.open();
    let order = session.manager.get_order(id)?;
    if !confirm(&format!("Delete order {}?", order.id), force)? {
        return Ok(());
    }
    let order = session.manager.delete_order(id)?;
    println!("Deleted order {}", order.id);
    Ok(())
}

pub fn handle_order_list(ctx: &Context, json: bool) -> Result<()> {
    let session = ctx.open();
    let orders = session.manager.list_orders();

    if json {
        print_json(&orders)?;
    } else if orders.is_empty() {
        println!("No orders found.");
    } else {
        println!("Orders:\n");
        for o in orders {
            println!("  {}", o);
            for item in &o.items {
                let name = session
                    .manager
                    .get_dish(item.dish_id)
                    .map(|d| d.name.as_str())
                    .unwrap_or("(removed dish)");
                println!("      {} x {}", item.quantity, name);
            }
            if let Some(closed_at) = o.closed_at {
                println!(
                    "      closed {} | total: {}",
                    format_time(&closed_at),
                    money(o.total)
                );
            }
        }
    }
    Ok(())
}

// -------------------------------------------------------------------------
// Statistics
// -------------------------------------------------------------------------

pub fn handle_stats_revenue(ctx: &Context, json: bool) -> Result<()> {
    let session = ctx.open();
    let revenue = stats::closed_revenue(session.manager.orders())?;

    if json {
        #[derive(Serialize)]
        struct RevenueJson {
            #[serde(with = "rust_decimal::serde::arbitrary_precision")]
            revenue: Decimal,
            closed_orders: usize,
        }

        print_json(&RevenueJson {
            revenue,
            closed_orders: session
                .manager
                .orders()
                .iter()
                .filter(|o| o.is_closed())
                .count(),
        })?;
    } else {
        println!("Revenue from closed orders: {}", money(revenue));
    }
    Ok(())
}

pub fn handle_stats_check(ctx: &Context, client_id: u32, json: bool) -> Result<()> {
    let session = ctx.open();
    let check = stats::client_check(session.manager.orders(), client_id)?;

    match (check, json) {
        (Some(check), true) => print_json(&check)?,
        (None, true) => print_json(&serde_json::Value::Null)?,
        (None, false) => println!("Client {} has no closed orders.", client_id),
        (Some(check), false) => {
            println!("Check for client {}", check.client_id);
            println!("====================================");
            for line in &check.lines {
                println!(
                    "Order {} | {} | total: {}",
                    line.order_id,
                    format_time(&line.closed_at),
                    money(line.total)
                );
            }
            println!("====================================");
            println!("TOTAL: {}", money(check.total));
        }
    }
    Ok(())
}

pub fn handle_stats_dishes(ctx: &Context, json: bool) -> Result<()> {
    let session = ctx.open();
    let sales = stats::dish_sales(session.manager.orders(), session.manager.dishes());

    if json {
        print_json(&sales)?;
    } else if sales.is_empty() {
        println!("No dishes sold yet.");
    } else {
        println!("Dish sales (portions):\n");
        for s in sales {
            println!("  {} - {}", s.name, s.quantity);
        }
    }
    Ok(())
}

// -------------------------------------------------------------------------
// Clock
// -------------------------------------------------------------------------

pub fn handle_clock_show(ctx: &Context) -> Result<()> {
    let config = ctx.load_config();
    let clock = config.clock(ctx.at);
    let source = if ctx.at.is_some() {
        "--at"
    } else if config.virtual_now.is_some() {
        "simulated"
    } else {
        "real"
    };
    println!("Current time: {} ({})", format_time(&clock.now()), source);
    Ok(())
}

pub fn handle_clock_set(ctx: &Context, time: NaiveDateTime) -> Result<()> {
    let mut config = ctx.load_config();
    config.virtual_now = Some(time);
    config.save(&ctx.config_path)?;
    tracing::info!(now = %format_time(&time), "set virtual time");
    println!("Simulated time set to {}", format_time(&time));
    Ok(())
}

pub fn handle_clock_reset(ctx: &Context) -> Result<()> {
    let mut config = ctx.load_config();
    config.virtual_now = None;
    config.save(&ctx.config_path)?;
    println!("Following the real clock again.");
    Ok(())
}

// -------------------------------------------------------------------------
// Data directory
// -------------------------------------------------------------------------

pub fn handle_data_path(ctx: &Context) -> Result<()> {
    let config = ctx.load_config();
    println!("{}", config.data_dir().display());
    Ok(())
}

pub fn handle_data_set_path(ctx: &Context, dir: PathBuf, copy: bool) -> Result<()> {
    let mut session = ctx.open();
    let copy_warnings: Vec<Warning> = session.manager.relocate(dir.clone(), copy);
    warnings::report(&copy_warnings);

    session.config.data_path = Some(dir.clone());
    session.config.save(&ctx.config_path)?;

    println!("Data directory set to {}", dir.display());
    print_counts(&session.manager);
    Ok(())
}

pub fn handle_data_save(ctx: &Context) -> Result<()> {
    let session = ctx.open();
    session.manager.save_all()?;
    println!("Saved data to {}", display_dir(session.manager.data_dir()));
    Ok(())
}

pub fn handle_data_load(ctx: &Context) -> Result<()> {
    let config = ctx.load_config();
    let (manager, load_warnings) = RestaurantManager::open(JsonStore::new(config.data_dir()));
    warnings::report(&load_warnings);

    println!("Loaded data from {}", display_dir(manager.data_dir()));
    print_counts(&manager);
    if !load_warnings.is_empty() {
        return Err(RestoranError::Storage(format!(
            "{} data file(s) could not be read",
            load_warnings.len()
        )));
    }
    Ok(())
}

pub fn handle_data_clear(ctx: &Context, force: bool) -> Result<()> {
    let mut session = ctx.open();
    if !confirm("Delete ALL data? This cannot be undone.", force)? {
        return Ok(());
    }
    session.manager.clear_all()?;
    println!("All data cleared.");
    Ok(())
}

fn print_counts(manager: &RestaurantManager) {
    println!(
        "  {} tables, {} reservations, {} dishes, {} orders",
        manager.tables().len(),
        manager.reservations().len(),
        manager.dishes().len(),
        manager.orders().len()
    );
}

fn display_dir(dir: Option<&Path>) -> String {
    dir.map(|d| d.display().to_string()).unwrap_or_default()
}

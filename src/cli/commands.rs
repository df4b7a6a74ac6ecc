use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::clock::{parse_time, TIME_FORMAT};
use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(name = "restoran")]
#[command(version, about = "Tables, reservations, menu and orders for a single restaurant")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "RESTORAN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Act as if the current time were this instant ("YYYY-MM-DD HH:MM")
    #[arg(long, global = true, value_parser = parse_time_arg)]
    pub at: Option<NaiveDateTime>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and config file
    Init {
        /// Fill the new directory with demo data
        #[arg(long)]
        seed: bool,
    },

    /// Replace all data with the demo dataset
    Seed {
        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Manage tables
    Table(TableCommand),

    /// Manage reservations
    Reservation(ReservationCommand),

    /// Manage the menu
    Dish(DishCommand),

    /// Manage orders
    Order(OrderCommand),

    /// Revenue and sales reports
    Stats(StatsCommand),

    /// Show or move the simulated current time
    Clock(ClockCommand),

    /// Data directory and bulk operations
    Data(DataCommand),
}

#[derive(Args, Debug)]
pub struct TableCommand {
    #[command(subcommand)]
    pub action: TableAction,
}

#[derive(Subcommand, Debug)]
pub enum TableAction {
    /// Add a table
    Add {
        /// Where the table stands (e.g. "by the window")
        location: String,

        /// Number of seats
        #[arg(long, default_value_t = 4)]
        seats: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change a table that is not occupied right now
    Edit {
        id: u32,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        seats: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a table without reservations
    Delete {
        id: u32,

        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// List tables
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a table and its reservation schedule
    Info {
        id: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ReservationCommand {
    #[command(subcommand)]
    pub action: ReservationAction,
}

#[derive(Subcommand, Debug)]
pub enum ReservationAction {
    /// Book a table
    Add {
        /// Table ID
        #[arg(long)]
        table: u32,

        /// Client ID
        #[arg(long)]
        client: u32,

        /// Client name
        #[arg(long)]
        name: String,

        /// Contact phone
        #[arg(long)]
        phone: String,

        /// Start ("YYYY-MM-DD HH:MM")
        #[arg(long, value_parser = parse_time_arg)]
        start: NaiveDateTime,

        /// End ("YYYY-MM-DD HH:MM"), exclusive
        #[arg(long, value_parser = parse_time_arg)]
        end: NaiveDateTime,

        #[arg(long)]
        comment: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change a reservation
    Edit {
        id: u32,

        #[arg(long, value_parser = parse_time_arg)]
        start: Option<NaiveDateTime>,

        #[arg(long, value_parser = parse_time_arg)]
        end: Option<NaiveDateTime>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long, conflicts_with = "clear_comment")]
        comment: Option<String>,

        /// Remove the comment
        #[arg(long)]
        clear_comment: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a reservation's end later
    Extend {
        id: u32,

        /// New end ("YYYY-MM-DD HH:MM")
        #[arg(long, value_parser = parse_time_arg)]
        end: NaiveDateTime,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cancel a reservation
    Cancel {
        id: u32,

        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// List reservations by start time
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find reservations by client name or phone
    Find {
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct DishCommand {
    #[command(subcommand)]
    pub action: DishAction,
}

#[derive(Subcommand, Debug)]
pub enum DishAction {
    /// Add a dish to the menu
    Add {
        name: String,

        /// Price, e.g. 12.50
        #[arg(long, value_parser = parse_price_arg)]
        price: Decimal,

        /// Menu section (drinks, salads, cold_starters, hot_starters, soups,
        /// main_courses, dessert, other); anything else files under other
        #[arg(long, default_value = "other")]
        category: String,

        #[arg(long, default_value = "")]
        composition: String,

        /// Portion weight, free text (e.g. "250g")
        #[arg(long, default_value = "")]
        weight: String,

        /// Cooking time in minutes
        #[arg(long, default_value_t = 0)]
        cook_time: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change a dish
    Edit {
        id: u32,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_parser = parse_price_arg)]
        price: Option<Decimal>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        composition: Option<String>,

        #[arg(long)]
        weight: Option<String>,

        #[arg(long)]
        cook_time: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a dish no order contains
    Delete {
        id: u32,

        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// List the menu by section
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct OrderCommand {
    #[command(subcommand)]
    pub action: OrderAction,
}

#[derive(Subcommand, Debug)]
pub enum OrderAction {
    /// Open an order for a client seated at their reserved table
    Create {
        /// Client ID
        #[arg(long)]
        client: u32,

        /// Table ID
        #[arg(long)]
        table: u32,

        /// Waiter ID
        #[arg(long, default_value_t = 1)]
        waiter: u32,

        #[arg(long, default_value = "")]
        comment: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a dish to an open order
    AddItem {
        order_id: u32,

        /// Dish ID
        #[arg(long)]
        dish: u32,

        #[arg(long, default_value_t = 1)]
        quantity: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Close an order and compute its total
    Close {
        id: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an order
    Delete {
        id: u32,

        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// List orders
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct StatsCommand {
    #[command(subcommand)]
    pub action: StatsAction,
}

#[derive(Subcommand, Debug)]
pub enum StatsAction {
    /// Sum of all closed orders
    Revenue {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a client's check over their closed orders
    Check {
        client_id: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Portions sold per dish
    Dishes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ClockCommand {
    #[command(subcommand)]
    pub action: ClockAction,
}

#[derive(Subcommand, Debug)]
pub enum ClockAction {
    /// Show the current (possibly simulated) time
    Show,

    /// Pin the simulated time
    Set {
        /// New time ("YYYY-MM-DD HH:MM")
        #[arg(value_parser = parse_time_arg)]
        time: NaiveDateTime,
    },

    /// Follow the real clock again
    Reset,
}

#[derive(Args, Debug)]
pub struct DataCommand {
    #[command(subcommand)]
    pub action: DataAction,
}

#[derive(Subcommand, Debug)]
pub enum DataAction {
    /// Print the data directory
    Path,

    /// Switch to another data directory
    SetPath {
        dir: PathBuf,

        /// Copy the current data files into the new directory first
        #[arg(long)]
        copy: bool,
    },

    /// Rewrite all data files
    Save,

    /// Re-read all data files and report problems
    Load,

    /// Delete every table, reservation, dish and order
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },
}

fn parse_time_arg(s: &str) -> Result<NaiveDateTime, String> {
    parse_time(s).ok_or_else(|| format!("expected time as {}, got '{}'", TIME_FORMAT, s))
}

fn parse_price_arg(s: &str) -> Result<Decimal, String> {
    Decimal::from_str(s.trim()).map_err(|e| format!("invalid price '{}': {}", s, e))
}

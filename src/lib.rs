pub mod cli;
pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod manager;
pub mod seed;
pub mod stats;
pub mod storage;
pub mod warnings;

pub use clock::{Clock, SystemClock, VirtualClock};
pub use config::Config;
pub use error::{Conflict, EntityKind, RestoranError, Result};
pub use manager::RestaurantManager;
pub use storage::JsonStore;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::entity::{Dish, Order, Reservation, Table};
use crate::error::Result;
use crate::warnings::Warning;

pub const TABLES_FILE: &str = "tables.json";
pub const RESERVATIONS_FILE: &str = "reservations.json";
pub const DISHES_FILE: &str = "dishes.json";
pub const ORDERS_FILE: &str = "orders.json";

/// Every file a data directory holds.
pub const DATA_FILES: [&str; 4] = [TABLES_FILE, RESERVATIONS_FILE, DISHES_FILE, ORDERS_FILE];

/// The four collections, as kept in memory and on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantData {
    pub tables: Vec<Table>,
    pub reservations: Vec<Reservation>,
    pub dishes: Vec<Dish>,
    pub orders: Vec<Order>,
}

impl RestaurantData {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.reservations.is_empty()
            && self.dishes.is_empty()
            && self.orders.is_empty()
    }
}

/// Result of reading a data directory. Collections that could not be read
/// are empty in `data` and listed in `warnings`.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub data: RestaurantData,
    pub warnings: Vec<Warning>,
}

/// One pretty-printed JSON array per entity type inside a directory. Every
/// save rewrites each file in full.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Read one collection. A missing file is an empty collection.
    pub fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&path)?;
        let items = serde_json::from_str(&json)?;
        Ok(items)
    }

    pub fn save<T: Serialize>(&self, file: &str, items: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        fs::write(self.dir.join(file), json)?;
        Ok(())
    }

    /// Read all four collections, degrading each unreadable one to empty.
    pub fn load_all(&self) -> LoadReport {
        let mut warnings = Vec::new();
        let data = RestaurantData {
            tables: self.load_or_warn(TABLES_FILE, &mut warnings),
            reservations: self.load_or_warn(RESERVATIONS_FILE, &mut warnings),
            dishes: self.load_or_warn(DISHES_FILE, &mut warnings),
            orders: self.load_or_warn(ORDERS_FILE, &mut warnings),
        };
        tracing::debug!(
            dir = %self.dir.display(),
            tables = data.tables.len(),
            reservations = data.reservations.len(),
            dishes = data.dishes.len(),
            orders = data.orders.len(),
            "loaded data directory"
        );
        LoadReport { data, warnings }
    }

    fn load_or_warn<T: DeserializeOwned>(&self, file: &str, warnings: &mut Vec<Warning>) -> Vec<T> {
        match self.load(file) {
            Ok(items) => items,
            Err(e) => {
                let path = self.dir.join(file);
                tracing::warn!(path = %path.display(), error = %e, "treating unreadable data file as empty");
                warnings.push(Warning::UnreadableDataFile {
                    path,
                    reason: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Write all four collections, creating the directory if needed.
    pub fn save_all(&self, data: &RestaurantData) -> Result<()> {
        self.ensure_dir()?;
        self.save(TABLES_FILE, &data.tables)?;
        self.save(RESERVATIONS_FILE, &data.reservations)?;
        self.save(DISHES_FILE, &data.dishes)?;
        self.save(ORDERS_FILE, &data.orders)?;
        Ok(())
    }
}

/// Best-effort copy of the known data files from `from` into `to`. Files
/// missing in `from` are skipped silently; failed copies become warnings.
pub fn copy_data_files(from: &Path, to: &Path) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if let Err(e) = fs::create_dir_all(to) {
        warnings.push(Warning::CopyFailed {
            path: to.to_path_buf(),
            reason: e.to_string(),
        });
        return warnings;
    }

    for file in DATA_FILES {
        let src = from.join(file);
        if !src.exists() {
            continue;
        }
        if let Err(e) = fs::copy(&src, to.join(file)) {
            tracing::warn!(path = %src.display(), error = %e, "failed to copy data file");
            warnings.push(Warning::CopyFailed {
                path: src,
                reason: e.to_string(),
            });
        }
    }
    warnings
}

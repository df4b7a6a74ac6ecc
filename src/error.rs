use std::fmt;

use thiserror::Error;

/// The four kinds of records the manager owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Table,
    Reservation,
    Dish,
    Order,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Table => write!(f, "table"),
            EntityKind::Reservation => write!(f, "reservation"),
            EntityKind::Dish => write!(f, "dish"),
            EntityKind::Order => write!(f, "order"),
        }
    }
}

/// Business-rule violations. Distinct from a missing id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    #[error("table {table_id} is already booked by reservation {reservation_id} in that period")]
    ReservationOverlap { table_id: u32, reservation_id: u32 },

    #[error("table {table_id} is occupied right now (reservation {reservation_id})")]
    TableOccupied { table_id: u32, reservation_id: u32 },

    #[error("table {table_id} is referenced by {reservations} reservation(s)")]
    TableReferenced { table_id: u32, reservations: usize },

    #[error("dish {dish_id} is referenced by {orders} order(s)")]
    DishReferenced { dish_id: u32, orders: usize },

    #[error("client {client_id} has no reservation on table {table_id} covering the current time")]
    NoActiveReservation { client_id: u32, table_id: u32 },

    #[error("order {order_id} is already closed")]
    OrderClosed { order_id: u32 },
}

#[derive(Error, Debug)]
pub enum RestoranError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u32 },

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Conflict: {0}")]
    Conflict(#[from] Conflict),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RestoranError {
    pub fn not_found(kind: EntityKind, id: u32) -> Self {
        RestoranError::NotFound { kind, id }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        RestoranError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RestoranError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RestoranError::Conflict(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RestoranError::Validation { .. })
    }

    /// The conflict behind this error, if it is one.
    pub fn conflict(&self) -> Option<&Conflict> {
        match self {
            RestoranError::Conflict(c) => Some(c),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RestoranError>;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{comment_or_placeholder, Identified};
use crate::clock::format_time;

/// A booking of one table for the half-open period `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: u32,
    pub client_id: u32,
    pub client_name: String,
    pub phone: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub comment: Option<String>,
    pub table_id: u32,
}

impl Reservation {
    /// Whether `[start, end)` intersects `[s, e)`. Touching endpoints do not
    /// overlap.
    pub fn overlaps(&self, s: NaiveDateTime, e: NaiveDateTime) -> bool {
        self.start < e && s < self.end
    }

    /// Whether the reservation is in effect at `t`: `start <= t < end`.
    pub fn covers(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end
    }

    pub fn comment_text(&self) -> &str {
        comment_or_placeholder(self.comment.as_deref().unwrap_or(""))
    }
}

impl Identified for Reservation {
    fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID {} | client {} | table {} | {} ({}) | {} - {} | comment: {}",
            self.id,
            self.client_id,
            self.table_id,
            self.client_name,
            self.phone,
            format_time(&self.start),
            format_time(&self.end),
            self.comment_text()
        )
    }
}

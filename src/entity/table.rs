use std::fmt;

use serde::{Deserialize, Serialize};

use super::Identified;

/// A dining table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: u32,
    pub location: String,
    pub seats: u32,
}

impl Identified for Table {
    fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID {} | {} | seats: {}", self.id, self.location, self.seats)
    }
}

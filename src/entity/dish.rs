use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Identified;

/// Menu section of a dish. Serialized by its symbolic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum DishCategory {
    Drinks,
    Salads,
    ColdStarters,
    HotStarters,
    Soups,
    MainCourses,
    Dessert,
    #[default]
    Other,
}

impl DishCategory {
    pub const ALL: [DishCategory; 8] = [
        DishCategory::Drinks,
        DishCategory::Salads,
        DishCategory::ColdStarters,
        DishCategory::HotStarters,
        DishCategory::Soups,
        DishCategory::MainCourses,
        DishCategory::Dessert,
        DishCategory::Other,
    ];

    /// Lenient parse for operator input: anything unrecognised lands in
    /// [`DishCategory::Other`] instead of being rejected.
    pub fn from_input(s: &str) -> Self {
        s.parse().unwrap_or(DishCategory::Other)
    }
}

impl fmt::Display for DishCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DishCategory::Drinks => write!(f, "Drinks"),
            DishCategory::Salads => write!(f, "Salads"),
            DishCategory::ColdStarters => write!(f, "ColdStarters"),
            DishCategory::HotStarters => write!(f, "HotStarters"),
            DishCategory::Soups => write!(f, "Soups"),
            DishCategory::MainCourses => write!(f, "MainCourses"),
            DishCategory::Dessert => write!(f, "Dessert"),
            DishCategory::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for DishCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "drinks" => Ok(DishCategory::Drinks),
            "salads" => Ok(DishCategory::Salads),
            "coldstarters" => Ok(DishCategory::ColdStarters),
            "hotstarters" => Ok(DishCategory::HotStarters),
            "soups" => Ok(DishCategory::Soups),
            "maincourses" => Ok(DishCategory::MainCourses),
            "dessert" | "desserts" => Ok(DishCategory::Dessert),
            "other" => Ok(DishCategory::Other),
            _ => Err(format!("Invalid dish category: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: u32,
    pub name: String,
    pub composition: String,
    pub weight: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    pub category: DishCategory,
    pub cook_time_minutes: u32,
}

impl Identified for Dish {
    fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for Dish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID {} | {} | {} | {:.2}",
            self.id, self.name, self.category, self.price
        )
    }
}

//! Demo dataset for trying the tool out.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::entity::{Dish, DishCategory, Order, OrderItem, Reservation, Table};
use crate::storage::RestaurantData;

fn table(id: u32, location: &str, seats: u32) -> Table {
    Table {
        id,
        location: location.to_string(),
        seats,
    }
}

fn dish(
    id: u32,
    name: &str,
    composition: &str,
    weight: &str,
    price: i64,
    category: DishCategory,
    cook_time_minutes: u32,
) -> Dish {
    Dish {
        id,
        name: name.to_string(),
        composition: composition.to_string(),
        weight: weight.to_string(),
        price: Decimal::new(price, 0),
        category,
        cook_time_minutes,
    }
}

/// Four tables, four dishes, two reservations on table 3 for the day of
/// `now`, one closed order and one open order.
pub fn demo_data(now: NaiveDateTime) -> RestaurantData {
    let today = now.date().and_time(NaiveTime::MIN);

    let tables = vec![
        table(1, "by the window", 4),
        table(2, "by the aisle", 2),
        table(3, "in the back", 6),
        table(4, "by the door", 4),
    ];

    let dishes = vec![
        dish(1, "Americano", "water, coffee", "200", 120, DishCategory::Drinks, 5),
        dish(2, "Chicken Caesar", "lettuce, chicken, dressing", "250", 420, DishCategory::Salads, 15),
        dish(3, "Mushroom soup", "mushrooms, broth", "300", 280, DishCategory::Soups, 20),
        dish(4, "Cheesecake", "cream cheese, biscuit", "120", 350, DishCategory::Dessert, 30),
    ];

    let reservations = vec![
        Reservation {
            id: 1,
            client_id: 101,
            client_name: "Max".to_string(),
            phone: "88005553535".to_string(),
            start: today + Duration::hours(12),
            end: today + Duration::hours(15),
            comment: Some("Birthday".to_string()),
            table_id: 3,
        },
        Reservation {
            id: 2,
            client_id: 102,
            client_name: "Anna".to_string(),
            phone: "5745552377".to_string(),
            start: today + Duration::hours(16),
            end: today + Duration::hours(17),
            comment: Some("Business meeting".to_string()),
            table_id: 3,
        },
    ];

    let orders = vec![
        Order {
            id: 1,
            client_id: 101,
            table_id: 3,
            items: vec![
                OrderItem {
                    dish_id: 2,
                    quantity: 2,
                },
                OrderItem {
                    dish_id: 3,
                    quantity: 1,
                },
            ],
            comment: "Paid in cash".to_string(),
            created_at: now - Duration::hours(2),
            waiter_id: 1,
            closed_at: Some(now - Duration::hours(1)),
            total: Decimal::new(2 * 420 + 280, 0),
        },
        Order {
            id: 2,
            client_id: 102,
            table_id: 1,
            items: vec![OrderItem {
                dish_id: 1,
                quantity: 3,
            }],
            comment: String::new(),
            created_at: now - Duration::minutes(30),
            waiter_id: 2,
            closed_at: None,
            total: Decimal::ZERO,
        },
    ];

    RestaurantData {
        tables,
        reservations,
        dishes,
        orders,
    }
}

mod dish;
mod order;
mod reservation;
mod table;

pub use dish::{Dish, DishCategory};
pub use order::{Order, OrderItem};
pub use reservation::Reservation;
pub use table::Table;

/// Records addressed by a sequential integer id.
pub trait Identified {
    fn id(&self) -> u32;
}

/// The id the next record of a collection receives: one past the current
/// maximum, or 1 for an empty collection. Deleted ids below the maximum are
/// never handed out again.
pub fn next_id<T: Identified>(items: &[T]) -> u32 {
    items.iter().map(Identified::id).max().map_or(1, |max| max + 1)
}

/// Text shown in summaries when an optional comment is blank.
pub(crate) fn comment_or_placeholder(comment: &str) -> &str {
    if comment.trim().is_empty() {
        "none"
    } else {
        comment
    }
}

mod commands;
mod handlers;

pub use commands::{
    Cli, ClockAction, ClockCommand, Commands, DataAction, DataCommand, DishAction, DishCommand,
    OrderAction, OrderCommand, ReservationAction, ReservationCommand, StatsAction, StatsCommand,
    TableAction, TableCommand,
};
pub use handlers::{
    handle_clock_reset, handle_clock_set, handle_clock_show, handle_data_clear, handle_data_load,
    handle_data_path, handle_data_save, handle_data_set_path, handle_dish_add, handle_dish_delete,
    handle_dish_edit, handle_dish_list, handle_init, handle_order_add_item, handle_order_close,
    handle_order_create, handle_order_delete, handle_order_list, handle_reservation_add,
    handle_reservation_cancel, handle_reservation_edit, handle_reservation_extend,
    handle_reservation_find, handle_reservation_list, handle_seed, handle_stats_check,
    handle_stats_dishes, handle_stats_revenue, handle_table_add, handle_table_delete,
    handle_table_edit, handle_table_info, handle_table_list, Context,
};

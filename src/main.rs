use clap::Parser;
use restoran::cli::{
    handle_clock_reset, handle_clock_set, handle_clock_show, handle_data_clear, handle_data_load,
    handle_data_path, handle_data_save, handle_data_set_path, handle_dish_add, handle_dish_delete,
    handle_dish_edit, handle_dish_list, handle_init, handle_order_add_item, handle_order_close,
    handle_order_create, handle_order_delete, handle_order_list, handle_reservation_add,
    handle_reservation_cancel, handle_reservation_edit, handle_reservation_extend,
    handle_reservation_find, handle_reservation_list, handle_seed, handle_stats_check,
    handle_stats_dishes, handle_stats_revenue, handle_table_add, handle_table_delete,
    handle_table_edit, handle_table_info, handle_table_list, Cli, ClockAction, Commands, Context,
    DataAction, DishAction, OrderAction, ReservationAction, StatsAction, TableAction,
};

fn main() {
    // Logs go to stderr so --json output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restoran=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = Context::new(cli.config, cli.at);

    let result = match cli.command {
        Commands::Init { seed } => handle_init(&ctx, seed),
        Commands::Seed { force } => handle_seed(&ctx, force),
        Commands::Table(cmd) => match cmd.action {
            TableAction::Add {
                location,
                seats,
                json,
            } => handle_table_add(&ctx, location, seats, json),
            TableAction::Edit {
                id,
                location,
                seats,
                json,
            } => handle_table_edit(&ctx, id, location, seats, json),
            TableAction::Delete { id, force } => handle_table_delete(&ctx, id, force),
            TableAction::List { json } => handle_table_list(&ctx, json),
            TableAction::Info { id, json } => handle_table_info(&ctx, id, json),
        },
        Commands::Reservation(cmd) => match cmd.action {
            ReservationAction::Add {
                table,
                client,
                name,
                phone,
                start,
                end,
                comment,
                json,
            } => handle_reservation_add(&ctx, table, client, name, phone, start, end, comment, json),
            ReservationAction::Edit {
                id,
                start,
                end,
                name,
                phone,
                comment,
                clear_comment,
                json,
            } => handle_reservation_edit(
                &ctx,
                id,
                start,
                end,
                name,
                phone,
                comment,
                clear_comment,
                json,
            ),
            ReservationAction::Extend { id, end, json } => {
                handle_reservation_extend(&ctx, id, end, json)
            }
            ReservationAction::Cancel { id, force } => handle_reservation_cancel(&ctx, id, force),
            ReservationAction::List { json } => handle_reservation_list(&ctx, json),
            ReservationAction::Find { query, json } => handle_reservation_find(&ctx, query, json),
        },
        Commands::Dish(cmd) => match cmd.action {
            DishAction::Add {
                name,
                price,
                category,
                composition,
                weight,
                cook_time,
                json,
            } => handle_dish_add(&ctx, name, price, category, composition, weight, cook_time, json),
            DishAction::Edit {
                id,
                name,
                price,
                category,
                composition,
                weight,
                cook_time,
                json,
            } => handle_dish_edit(
                &ctx,
                id,
                name,
                price,
                category,
                composition,
                weight,
                cook_time,
                json,
            ),
            DishAction::Delete { id, force } => handle_dish_delete(&ctx, id, force),
            DishAction::List { json } => handle_dish_list(&ctx, json),
        },
        Commands::Order(cmd) => match cmd.action {
            OrderAction::Create {
                client,
                table,
                waiter,
                comment,
                json,
            } => handle_order_create(&ctx, client, table, waiter, comment, json),
            OrderAction::AddItem {
                order_id,
                dish,
                quantity,
                json,
            } => handle_order_add_item(&ctx, order_id, dish, quantity, json),
            OrderAction::Close { id, json } => handle_order_close(&ctx, id, json),
            OrderAction::Delete { id, force } => handle_order_delete(&ctx, id, force),
            OrderAction::List { json } => handle_order_list(&ctx, json),
        },
        Commands::Stats(cmd) => match cmd.action {
            StatsAction::Revenue { json } => handle_stats_revenue(&ctx, json),
            StatsAction::Check { client_id, json } => handle_stats_check(&ctx, client_id, json),
            StatsAction::Dishes { json } => handle_stats_dishes(&ctx, json),
        },
        Commands::Clock(cmd) => match cmd.action {
            ClockAction::Show => handle_clock_show(&ctx),
            ClockAction::Set { time } => handle_clock_set(&ctx, time),
            ClockAction::Reset => handle_clock_reset(&ctx),
        },
        Commands::Data(cmd) => match cmd.action {
            DataAction::Path => handle_data_path(&ctx),
            DataAction::SetPath { dir, copy } => handle_data_set_path(&ctx, dir, copy),
            DataAction::Save => handle_data_save(&ctx),
            DataAction::Load => handle_data_load(&ctx),
            DataAction::Clear { force } => handle_data_clear(&ctx, force),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

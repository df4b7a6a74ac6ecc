mod json_store;

pub use json_store::{
    copy_data_files, JsonStore, LoadReport, RestaurantData, DATA_FILES, DISHES_FILE, ORDERS_FILE,
    RESERVATIONS_FILE, TABLES_FILE,
};

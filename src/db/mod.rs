pub mod auth_db;
pub mod schema;
pub mod store;

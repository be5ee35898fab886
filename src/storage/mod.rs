pub mod database;
pub mod history;
pub mod secure_store;

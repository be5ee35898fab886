pub mod client;
pub mod uploads;

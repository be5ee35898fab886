pub mod browser;
pub mod filename;
pub mod logging;
pub mod notification;

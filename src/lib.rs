pub mod api;
pub mod config;
pub mod error;
pub mod screenshots;
pub mod storage;
pub mod utils;

pub use api::uploads::{ImgurUploader, UploadEvent, UploaderState};
pub use config::UploaderConfig;
pub use error::UploadError;

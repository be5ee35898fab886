use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";
pub const DEFAULT_DELETE_URL: &str = "https://imgur.com/delete/";
pub const PLACEHOLDER_API_KEY: &str = "insert-api-key-here";
pub const DEFAULT_FILENAME_PATTERN: &str = "%F_%H-%M";
pub const DEFAULT_HISTORY_LIMIT: usize = 25;

#[derive(Serialize, Deserialize, Clone)]
pub struct UploaderConfig {
    pub upload_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub delete_url_base: String,
    pub filename_pattern: String,
    pub history_limit: usize,
    pub history_path: PathBuf,
    pub timeout_secs: Option<u64>, // None = transport default
    pub strict_response: bool,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            delete_url_base: DEFAULT_DELETE_URL.to_string(),
            filename_pattern: DEFAULT_FILENAME_PATTERN.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_path: default_history_path(),
            timeout_secs: None,
            strict_response: true,
        }
    }
}

impl fmt::Debug for UploaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploaderConfig")
            .field("upload_url", &self.upload_url)
            .field("api_key", &"[redacted]")
            .field("delete_url_base", &self.delete_url_base)
            .field("filename_pattern", &self.filename_pattern)
            .field("history_limit", &self.history_limit)
            .field("history_path", &self.history_path)
            .field("timeout_secs", &self.timeout_secs)
            .field("strict_response", &self.strict_response)
            .finish()
    }
}

impl UploaderConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("IMGBB_UPLOAD_URL") {
            config.upload_url = val;
        }

        match std::env::var("IMGBB_API_KEY") {
            Ok(val) if !val.is_empty() => config.api_key = val,
            _ => match crate::storage::secure_store::get_api_key() {
                Ok(Some(key)) => config.api_key = key,
                Ok(None) => {
                    log::warn!("No imgbb API key configured, using placeholder key");
                }
                Err(e) => {
                    log::warn!("Failed to read API key from keyring: {}", e);
                }
            },
        }

        if let Ok(val) = std::env::var("IMGBB_DELETE_URL") {
            config.delete_url_base = val;
        }

        if let Ok(val) = std::env::var("IMGBB_FILENAME_PATTERN") {
            config.filename_pattern = val;
        }

        if let Ok(val) = std::env::var("IMGBB_HISTORY_LIMIT") {
            config.history_limit =
                parse_or_default("IMGBB_HISTORY_LIMIT", &val, DEFAULT_HISTORY_LIMIT);
        }

        if let Ok(val) = std::env::var("IMGBB_HISTORY_PATH") {
            config.history_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("IMGBB_TIMEOUT_SECS") {
            config.timeout_secs = match val.trim().parse() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    log::warn!("Ignoring invalid IMGBB_TIMEOUT_SECS value {:?}", val);
                    None
                }
            };
        }

        if let Ok(val) = std::env::var("IMGBB_STRICT_RESPONSE") {
            config.strict_response = match parse_flag(&val) {
                Some(flag) => flag,
                None => {
                    log::warn!(
                        "Invalid IMGBB_STRICT_RESPONSE value {:?}, keeping strict responses",
                        val
                    );
                    true
                }
            };
        }

        config
    }

    pub fn delete_url(&self, delete_token: &str) -> String {
        format!("{}{}", self.delete_url_base, delete_token)
    }
}

fn parse_or_default<T: FromStr + fmt::Debug>(name: &str, val: &str, default: T) -> T {
    match val.trim().parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            log::warn!("Invalid {} value {:?}, using default {:?}", name, val, default);
            default
        }
    }
}

pub fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_history_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push("imgbb-uploader");
    path.push("history.db");
    path
}

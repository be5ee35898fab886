use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Write;

use crate::config::DEFAULT_FILENAME_PATTERN;

lazy_static! {
    static ref INVALID_FILENAME_CHARS: Regex = Regex::new(r#"[\\/:*?"<>|]"#).unwrap();
}

const FALLBACK_NAME: &str = "screenshot";

/// Expands the configured strftime pattern into a name for the uploaded file.
#[derive(Debug, Clone)]
pub struct FilenameHandler {
    pattern: String,
}

impl Default for FilenameHandler {
    fn default() -> Self {
        Self::new(DEFAULT_FILENAME_PATTERN)
    }
}

impl FilenameHandler {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
        }
    }

    pub fn pattern(&self) -> String {
        self.parse_at(&Local::now())
    }

    pub fn parse_at(&self, time: &DateTime<Local>) -> String {
        let mut expanded = String::new();
        if write!(expanded, "{}", time.format(&self.pattern)).is_err() {
            // chrono refuses unknown specifiers; keep the pattern literally
            log::warn!("Invalid filename pattern {:?}, using it verbatim", self.pattern);
            expanded = self.pattern.clone();
        }

        let cleaned = INVALID_FILENAME_CHARS.replace_all(expanded.trim(), "_");
        if cleaned.is_empty() {
            FALLBACK_NAME.to_string()
        } else {
            cleaned.into_owned()
        }
    }
}

use std::sync::Mutex;

/// Best-effort user-visible message sink.
pub trait Notifier: Send + Sync {
    fn show_message(&self, message: &str);
}

/// Writes messages to the log and remembers the most recent one.
#[derive(Debug, Default)]
pub struct LogNotifier {
    last_message: Mutex<Option<String>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_message(&self) -> Option<String> {
        self.last_message
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

impl Notifier for LogNotifier {
    fn show_message(&self, message: &str) {
        log::warn!("{}", message);
        if let Ok(mut last) = self.last_message.lock() {
            *last = Some(message.to_string());
        }
    }
}

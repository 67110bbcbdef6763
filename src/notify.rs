//! User-facing messages: alerts on failure, toasts and link dialogs on success.

use std::sync::Mutex;

pub trait Notifier {
    /// Blocking error message
    fn alert(&self, message: &str);

    /// Short-lived status message
    fn toast(&self, message: &str, title: &str);

    /// Dialog pointing the user at a new document
    fn show_link(&self, title: &str, message: &str, url: &str);
}

/// Writes everything to the terminal
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    fn toast(&self, message: &str, title: &str) {
        println!("[{}] {}", title, message);
    }

    fn show_link(&self, title: &str, message: &str, url: &str) {
        println!("{}", title);
        println!("  {}", message);
        println!("  Open: {}", url);
    }
}

/// A message captured by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Alert(String),
    Toast { title: String, message: String },
    Link { title: String, message: String, url: String },
}

/// Keeps every notice in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.push(Notice::Alert(message.to_string()));
    }

    fn toast(&self, message: &str, title: &str) {
        self.push(Notice::Toast {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn show_link(&self, title: &str, message: &str, url: &str) {
        self.push(Notice::Link {
            title: title.to_string(),
            message: message.to_string(),
            url: url.to_string(),
        });
    }
}

//! User-facing notification feed
//!
//! Collects messages for transfer outcomes, refresh failures and network
//! switches. The feed is bounded; the oldest entries fall off first.

use std::collections::VecDeque;

pub const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A notification entry with message and timestamp
#[derive(Debug, Clone)]
pub struct NotificationEntry {
    pub message: String,
    pub severity: Severity,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl NotificationEntry {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            timestamp: chrono::Local::now(),
        }
    }

    pub fn time_ago(&self) -> String {
        let duration = chrono::Local::now().signed_duration_since(self.timestamp);
        if duration.num_seconds() < 60 {
            "just now".to_string()
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h ago", duration.num_hours())
        } else {
            self.timestamp.format("%m/%d %H:%M").to_string()
        }
    }

    /// Prefix used when printing the entry to a console
    pub fn marker(&self) -> &'static str {
        match self.severity {
            Severity::Info => "[..]",
            Severity::Success => "[OK]",
            Severity::Error => "[!!]",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Notifications {
    entries: VecDeque<NotificationEntry>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity) {
        if self.entries.len() == MAX_NOTIFICATIONS {
            self.entries.pop_front();
        }
        self.entries.push_back(NotificationEntry::new(message, severity));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error);
    }

    pub fn latest(&self) -> Option<&NotificationEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every entry, oldest first
    pub fn drain(&mut self) -> Vec<NotificationEntry> {
        self.entries.drain(..).collect()
    }
}
